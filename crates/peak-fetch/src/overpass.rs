//! Overpass query for the elevation features already in the map.

/// Public Overpass interpreter.
pub const OVERPASS_API_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server side timeout in seconds.
const QUERY_TIMEOUT_S: u32 = 200;

/// Feature filters downloaded inside the municipality area.
const FEATURES: &[(&str, &str)] = &[
    ("natural", "peak"),
    ("natural", "hill"),
    ("natural", "cliff"),
    ("natural", "mountain_range"),
    ("natural", "ridge"),
    ("tourism", "viewpoint"),
];

/// Builds the Overpass QL query for a municipality number.
///
/// Members and parents of every match are included so that the output
/// document is complete for editing.
pub fn overpass_query(municipality_id: &str) -> String {
    let mut query = format!(
        "[timeout:{QUERY_TIMEOUT_S}];\
         (area[ref={municipality_id}][admin_level=7][place=municipality];)->.a;("
    );
    for (key, value) in FEATURES {
        query.push_str(&format!("nwr[\"{key}\"=\"{value}\"](area.a);"));
    }
    query.push_str(");(._;>;<;);out meta;");
    query
}

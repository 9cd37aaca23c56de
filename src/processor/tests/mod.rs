//! Pipeline tests for the extraction passes
//!
//! Drive whole logs through the processors and inspect the written tables.


/// Position fix in Lawrence, Kansas at 2025-09-04 22:47:45 UTC
pub const KANSAS_RMC: &str =
    " $GPRMC,224745.00,A,3858.3020,N,09514.1180,W,000.0,000.0,040925,,,A*6A";
pub const GGA: &str = " $GPGGA,224745.00,3858.3020,N,09514.1180,W,1,08,0.9,123.4,M,-26.9,M,,*47";
pub const GGA_HIGH: &str =
    " $GPGGA,224750.00,3858.3020,N,09514.1180,W,1,08,0.9,131.9,M,-26.9,M,,*47";
pub const SERVING: &str = " \"servingcell\",\"NOCONN\",\"LTE\",\"FDD\",310,260,1F4,101,5230,13,5,5,2B0C,-95,-10,-65,12,40";
pub const NEIGHBOR_A: &str = " \"neighbourcell intra\",\"LTE\",5230,102,-11,-98,-70,5,,";
pub const NEIGHBOR_B: &str = " \"neighbourcell intra\",\"LTE\",5230,317,-14,-104,-76,1,,";

/// Parse a written table into header and rows
pub fn read_table(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

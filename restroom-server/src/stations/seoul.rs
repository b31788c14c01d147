//! Built-in Seoul subway station table.
//!
//! Station names match the `STATN_NM` values the open-data directory uses
//! (no trailing "역"). Coordinates are station-entrance points.

use crate::domain::Coordinate;

use super::{Station, StationDirectory};

const SEOUL_STATIONS: &[(&str, f64, f64)] = &[
    ("강남", 37.4979, 127.0276),
    ("역삼", 37.5006, 127.0364),
    ("선릉", 37.5045, 127.0489),
    ("삼성", 37.5088, 127.0631),
    ("교대", 37.4934, 127.0146),
    ("사당", 37.4766, 126.9816),
    ("잠실", 37.5133, 127.1001),
    ("홍대입구", 37.5566, 126.9229),
    ("신촌", 37.5551, 126.9368),
    ("이대", 37.5567, 126.9459),
    ("합정", 37.5496, 126.9139),
    ("서울역", 37.5547, 126.9706),
    ("시청", 37.5657, 126.9769),
    ("종각", 37.5702, 126.9830),
    ("종로3가", 37.5704, 126.9920),
    ("을지로입구", 37.5660, 126.9826),
    ("동대문", 37.5714, 127.0095),
    ("동대문역사문화공원", 37.5655, 127.0090),
    ("충무로", 37.5614, 126.9940),
    ("명동", 37.5609, 126.9863),
    ("이태원", 37.5345, 126.9946),
    ("용산", 37.5299, 126.9646),
    ("왕십리", 37.5613, 127.0375),
    ("건대입구", 37.5404, 127.0694),
    ("성수", 37.5446, 127.0560),
    ("여의도", 37.5216, 126.9242),
    ("노량진", 37.5140, 126.9421),
    ("신도림", 37.5089, 126.8913),
    ("구로디지털단지", 37.4853, 126.9015),
    ("영등포", 37.5155, 126.9075),
    ("고속터미널", 37.5049, 127.0049),
    ("압구정", 37.5270, 127.0285),
    ("청담", 37.5194, 127.0536),
    ("혜화", 37.5822, 127.0019),
    ("안국", 37.5766, 126.9855),
    ("광화문", 37.5710, 126.9765),
];

/// Build the production station directory.
pub fn seoul_stations() -> StationDirectory {
    let stations = SEOUL_STATIONS
        .iter()
        .map(|(name, lat, lon)| {
            // The table above is static and in range.
            let coordinate =
                Coordinate::new(*lat, *lon).expect("built-in station table is valid");
            Station::new(*name, coordinate)
        })
        .collect();

    StationDirectory::new(stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_builds_and_is_non_trivial() {
        let dir = seoul_stations();
        assert!(dir.len() >= 30);
        assert!(dir.lookup("강남").is_some());
        assert!(dir.lookup("홍대입구").is_some());
    }

    #[test]
    fn no_duplicate_names() {
        let mut names: Vec<&str> = SEOUL_STATIONS.iter().map(|(n, _, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SEOUL_STATIONS.len());
    }
}

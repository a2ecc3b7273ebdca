//! Small hand-checked rainfall table shared by the data layer tests.

use super::Dataset;

pub const SAMPLE_CSV: &str = "\
SUBDIVISION , YEAR,JAN,FEB,MAR, ANNUAL
Konkan & Goa,2015,1.5,0.0,,2000
Konkan & Goa,2016,,,,2100
Konkan & Goa,2017,,,,1900
Madhya Maharashtra,2014,,,,700
Madhya Maharashtra,2015,,,,800
Madhya Maharashtra,2016,,,,900
Madhya Maharashtra,2017,,,,1000
Marathwada,2015,,,,600
Marathwada,2016,,,,NA
Marathwada,2017,,,,800
Gujarat Region,2012,,,,900
Gujarat Region,2013,,,,1000
Gujarat Region,2014,,,,1100
Saurashtra & Kutch,2013,,,,500
Saurashtra & Kutch,2014,,,,600
Saurashtra & Kutch,2015,,,,
,2016,,,,300
Goa,abc,,,,1200
";

pub fn sample_dataset() -> Dataset {
    Dataset::from_reader(SAMPLE_CSV.as_bytes()).expect("sample table loads")
}

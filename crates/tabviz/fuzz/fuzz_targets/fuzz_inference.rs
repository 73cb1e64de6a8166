//! Fuzz target for type inference, profiling and charting.
//!
//! Fuzzed text becomes the cells of a small table that is then profiled
//! and drawn, exercising number and date parsing on pathological values.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabviz::chart::{ChartKind, ChartSpecBuilder};
use tabviz::dataset::TypeInference;
use tabviz::input::RawTable;
use tabviz::render::{RenderConfig, render};
use tabviz::Profiler;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let cells: Vec<&str> = content.split('\n').collect();
        let rows = cells
            .iter()
            .map(|c| vec![c.to_string(), c.len().to_string()])
            .collect();
        let table = RawTable::new(vec!["value".to_string(), "length".to_string()], rows);

        if let Ok(dataset) = TypeInference::new().build_dataset(&table) {
            let _ = Profiler::new().profile(&dataset);
            let spec = ChartSpecBuilder::new(ChartKind::BoxPlot).x("value").y("length");
            if let Ok(request) = spec.build(&dataset) {
                let _ = render(&request, &dataset, &RenderConfig::default());
            }
        }
    }
});

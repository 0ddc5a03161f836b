//! Survey example: age group × favorite genre.
//!
//! Builds records from spreadsheet-like rows, runs the chi-square test,
//! prints the report and writes one tab-separated file per sheet.

use std::fs;
use std::io;
use std::path::PathBuf;

use contingency::report::Sheet;
use contingency::{
    analyze, catalogue, publish, AnalysisConfig, ChiSquareReport, Error, ReportSink,
};

/// Writes each sheet as `<dir>/<sheet>.tsv`.
struct TsvDirectory {
    dir: PathBuf,
}

impl TsvDirectory {
    fn write_sheet(&self, sheet: &Sheet) -> io::Result<()> {
        let body: Vec<String> = sheet
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect();
        fs::write(self.dir.join(format!("{}.tsv", sheet.name)), body.join("\n"))
    }
}

impl ReportSink for TsvDirectory {
    fn write_report(&mut self, report: &ChiSquareReport) -> contingency::Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(e.to_string()))?;
        for sheet in report.sheets() {
            self.write_sheet(&sheet)
                .map_err(|e| Error::persistence(format!("{}: {e}", sheet.name)))?;
        }
        Ok(())
    }
}

fn main() {
    println!("Contingency - Survey Example\n");

    let scheme = catalogue::get_by_name("age-genre").expect("Failed to load scheme");

    // Header cells carry stray whitespace, as exported spreadsheets often do
    let header = ["ID", " Grupo de edad", "Género favorito "];
    let rows = [
        ["1", "Jóvenes", "Terror"],
        ["2", "Jóvenes", "Terror"],
        ["3", "Jóvenes", "Comedia"],
        ["4", "Adultos", "Drama"],
        ["5", "Adultos", "Comedia"],
        ["6", "Adultos", "Drama"],
        ["7", "Adultos mayores", "Drama"],
        ["8", "Adultos mayores", "Drama"],
        ["9", "Adultos mayores", "Comedia"],
        ["10", "Jóvenes", "Terror"],
        ["11", "Adultos", "Documental"],
    ];

    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let fields = header.iter().copied().zip(row.iter().copied());
            scheme.record_from_fields(fields)
        })
        .collect();

    let report = analyze(&scheme, &records, &AnalysisConfig::default()).expect("Analysis failed");
    println!("{report}");

    let mut sink = TsvDirectory {
        dir: std::env::temp_dir().join("contingency-survey"),
    };
    match publish(&report, &mut sink) {
        Ok(()) => println!("Sheets written to {}", sink.dir.display()),
        Err(err) => println!("{err}. Close any program using the files and try again."),
    }
}

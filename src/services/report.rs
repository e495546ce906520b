// src/services/report.rs

use std::io::Write;

use crate::{common::error::AppError, models::dashboard::ReportRow};

const HEADER: [&str; 5] = ["DATA", "DESCRIÇÃO", "SETOR", "VALOR", "STATUS"];

/// Escreve o relatório em CSV, com o cabeçalho do relatório impresso.
pub fn write_report_csv<W: Write>(writer: W, rows: &[ReportRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn report_csv(rows: &[ReportRow]) -> Result<String, AppError> {
    let mut buffer = Vec::new();
    write_report_csv(&mut buffer, rows).map_err(anyhow::Error::from)?;
    let csv = String::from_utf8(buffer).map_err(anyhow::Error::from)?;
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let rows = vec![ReportRow {
            date: "14/02/2026".into(),
            description: "Conta de luz - Enel".into(),
            sector: "Enel".into(),
            amount: "R$ 485,00".into(),
            status: "PENDENTE".into(),
        }];

        let csv = report_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("DATA,DESCRIÇÃO,SETOR,VALOR,STATUS"));
        assert_eq!(
            lines.next(),
            Some("14/02/2026,Conta de luz - Enel,Enel,\"R$ 485,00\",PENDENTE")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_report_is_just_the_header() {
        assert_eq!(report_csv(&[]).unwrap(), "DATA,DESCRIÇÃO,SETOR,VALOR,STATUS\n");
    }
}

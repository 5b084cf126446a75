//! Whitespace-delimited result tables. Undefined values are written as `NA`.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;

use crate::stats::TestMethod;
use crate::util::value::Value;

use super::allele::{AlleleAssociation, AlleleResult};
use super::permutation::EmpiricalPValue;
use super::raw::{GeneAssociation, GeneResult};

const PERM_COLUMNS: &str = "P_perm N_perm_more N_perm_NA N_perm_less";

/// Write the per-allele header for `test`.
pub fn write_allele_header(writer: &mut impl Write, test: TestMethod, perm: bool) -> Result<()> {
    let stats = match test {
        TestMethod::ChiSquare => "P ChiSq DF P_fisher",
        TestMethod::Fisher => "P",
    };
    write!(
        writer,
        "Allele A_case B_case C_ctrl D_ctrl F_case F_ctrl Freq {} OR L95 U95 P_adj",
        stats
    )?;
    if perm {
        write!(writer, " {}", PERM_COLUMNS)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Write one per-allele result line.
pub fn write_allele_line(
    writer: &mut impl Write,
    result: &AlleleResult,
    test: TestMethod,
    perm: bool,
) -> Result<()> {
    let t = &result.table;
    let s = &result.stats;
    write!(
        writer,
        "{} {} {} {} {} {:.4} {:.4} {:.4}",
        result.allele,
        t.n1,
        t.n2,
        t.n3,
        t.n4,
        result.freq.case,
        result.freq.ctrl,
        result.freq.combined
    )?;
    match test {
        TestMethod::ChiSquare => write!(
            writer,
            " {} {:.4} {} {}",
            s.pvalue, s.chi2, s.dof, s.fisher_pvalue
        )?,
        TestMethod::Fisher => write!(writer, " {}", s.pvalue)?,
    }
    write!(
        writer,
        " {:.4} {:.4} {:.4} {}",
        s.odds_ratio, s.ci_lower, s.ci_upper, result.adjusted_pvalue
    )?;
    if perm {
        write_permutation(writer, result.permutation.as_ref())?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Write a full per-allele table.
pub fn write_allele_table(writer: &mut impl Write, assoc: &AlleleAssociation) -> Result<()> {
    let perm = assoc.n_perm.is_some();
    write_allele_header(writer, assoc.test, perm)?;
    for result in assoc.results.values() {
        write_allele_line(writer, result, assoc.test, perm)?;
    }
    Ok(())
}

pub fn write_gene_header(writer: &mut impl Write, perm: bool) -> Result<()> {
    write!(writer, "Gene ChiSq DF P N_alleles")?;
    if perm {
        write!(writer, " {}", PERM_COLUMNS)?;
    }
    writeln!(writer)?;
    Ok(())
}

pub fn write_gene_line(writer: &mut impl Write, result: &GeneResult, perm: bool) -> Result<()> {
    write!(
        writer,
        "{} {:.4} {} {} {}",
        result.gene,
        result.chi2,
        result.dof,
        result.pvalue,
        result.alleles.len()
    )?;
    if perm {
        write_permutation(writer, result.permutation.as_ref())?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Write a full gene-level table.
pub fn write_gene_table(writer: &mut impl Write, assoc: &GeneAssociation) -> Result<()> {
    let perm = assoc.n_perm.is_some();
    write_gene_header(writer, perm)?;
    for result in assoc.results.values() {
        write_gene_line(writer, result, perm)?;
    }
    Ok(())
}

/// Write per-gene score statistics.
pub fn write_score_table(writer: &mut impl Write, scores: &BTreeMap<String, Value>) -> Result<()> {
    writeln!(writer, "Gene U")?;
    for (gene, u) in scores {
        writeln!(writer, "{} {:.4}", gene, u)?;
    }
    Ok(())
}

fn write_permutation(writer: &mut impl Write, perm: Option<&EmpiricalPValue>) -> Result<()> {
    match perm {
        Some(p) => write!(
            writer,
            " {} {} {} {}",
            p.pvalue, p.more_extreme, p.na, p.less_extreme
        )?,
        None => write!(writer, " NA NA NA NA")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assoc::frequency::frequency;
    use crate::stats::{evaluate_table, ContingencyTable};

    fn result(table: ContingencyTable) -> AlleleResult {
        AlleleResult {
            allele: "A*01".parse().unwrap(),
            table,
            freq: frequency(table.n1, table.n1 + table.n2, table.n3, table.n3 + table.n4),
            stats: evaluate_table(&table, TestMethod::Fisher),
            adjusted_pvalue: Value::Na,
            permutation: None,
        }
    }

    #[test]
    fn test_allele_line_columns_match_header() {
        let mut buf = Vec::new();
        write_allele_header(&mut buf, TestMethod::Fisher, true).unwrap();
        write_allele_line(&mut buf, &result(ContingencyTable::new(10, 5, 3, 12)), TestMethod::Fisher, true)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0].split_whitespace().count(),
            lines[1].split_whitespace().count()
        );
        assert!(lines[1].starts_with("A*01 10 5 3 12 0.6667 0.2000 0.4333"));
        assert!(lines[1].contains(" 8.0000 "));
        assert!(lines[1].ends_with("NA NA NA NA NA"));
    }

    #[test]
    fn test_degenerate_row_prints_na() {
        let mut buf = Vec::new();
        write_allele_line(&mut buf, &result(ContingencyTable::new(0, 5, 3, 12)), TestMethod::Fisher, false)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let fields: Vec<&str> = text.split_whitespace().collect();
        // OR, L95, U95, P_adj
        assert_eq!(&fields[fields.len() - 4..], &["NA", "NA", "NA", "NA"]);
    }

    #[test]
    fn test_score_table() {
        let mut scores = BTreeMap::new();
        scores.insert("A".to_string(), Value::Num(1.23456));
        scores.insert("B".to_string(), Value::Na);
        let mut buf = Vec::new();
        write_score_table(&mut buf, &scores).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Gene U\nA 1.2346\nB NA\n");
    }
}

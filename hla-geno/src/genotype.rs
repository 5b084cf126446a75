//! HLA genotype table reader and case/control allele counter.
//!
//! Whitespace-delimited file with a header line. The first two columns are
//! the sample ID and phenotype; the remaining columns come in pairs, two
//! alleles per gene:
//! ```text
//! IID   PHENO A        A        DRB1      DRB1
//! s1    2     A*02:01  A*24:02  DRB1*15:01 DRB1*04:01
//! s2    1     02:01    NA       15:01     15:01
//! ```
//! Phenotype `2` marks a case and `1` a control; `0`, `-9` and `NA` are
//! missing and the sample is dropped. Alleles may omit the gene prefix, in
//! which case the column header supplies it.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::debug;

use crate::allele::AlleleId;
use crate::traits::{AlleleCounter, CohortCounts, EncodingModel};

const MISSING_ALLELE: &[&str] = &["NA", "0", "00", "-", ""];

/// Both allele calls of one sample at one gene.
pub type AllelePair = [Option<AlleleId>; 2];

/// Genotype calls for all samples with a non-missing phenotype.
#[derive(Debug, Clone)]
pub struct GenotypeTable {
    /// Sample IDs in file order.
    pub sample_ids: Vec<String>,
    /// Case (true) / control (false) label per sample.
    pub is_case: Vec<bool>,
    /// Gene name per column pair.
    pub genes: Vec<String>,
    /// `genotypes[i][g]`: sample i, gene g.
    pub genotypes: Vec<Vec<AllelePair>>,
}

impl GenotypeTable {
    /// Read a genotype file, truncating alleles to `digits` of resolution.
    pub fn from_path<P: AsRef<Path>>(path: P, digits: usize) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read genotype file: {}", path.display()))?;
        let table = Self::parse(&contents, digits)
            .with_context(|| format!("Invalid genotype file: {}", path.display()))?;
        debug!(
            "Loaded {} samples ({} cases) x {} genes from {}",
            table.sample_ids.len(),
            table.n_cases(),
            table.genes.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse genotype file contents.
    pub fn parse(contents: &str, digits: usize) -> Result<Self> {
        let mut lines = contents
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty genotype file"))?;
        let headers: Vec<&str> = header_line.split_whitespace().collect();
        if headers.len() < 4 || (headers.len() - 2) % 2 != 0 {
            bail!(
                "Header must have IID, PHENO and two columns per gene, got {} columns",
                headers.len()
            );
        }
        let genes: Vec<String> = headers[2..]
            .chunks(2)
            .map(|pair| gene_from_header(pair[0]).to_string())
            .collect();

        let mut sample_ids = Vec::new();
        let mut is_case = Vec::new();
        let mut genotypes = Vec::new();

        for (line_num, line) in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != headers.len() {
                bail!(
                    "Line {} has {} fields (expected {})",
                    line_num,
                    fields.len(),
                    headers.len()
                );
            }

            let case = match parse_phenotype(fields[1])
                .with_context(|| format!("line {}", line_num))?
            {
                Some(c) => c,
                None => continue,
            };

            let mut row = Vec::with_capacity(genes.len());
            for (gene, pair) in genes.iter().zip(fields[2..].chunks(2)) {
                let first = parse_allele(pair[0], gene, digits)
                    .with_context(|| format!("line {}", line_num))?;
                let second = parse_allele(pair[1], gene, digits)
                    .with_context(|| format!("line {}", line_num))?;
                row.push([first, second]);
            }

            sample_ids.push(fields[0].to_string());
            is_case.push(case);
            genotypes.push(row);
        }

        Ok(Self {
            sample_ids,
            is_case,
            genes,
            genotypes,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_cases(&self) -> usize {
        self.is_case.iter().filter(|&&c| c).count()
    }

    /// Count alleles under the given labels.
    pub fn count_with_labels(&self, model: EncodingModel, labels: &[bool]) -> CohortCounts {
        assert_eq!(labels.len(), self.genotypes.len());
        let mut counts = CohortCounts::default();

        for (row, &case) in self.genotypes.iter().zip(labels.iter()) {
            if case {
                counts.n_cases += 1;
            } else {
                counts.n_controls += 1;
            }
            let (alleles, totals) = if case {
                (&mut counts.case_alleles, &mut counts.case_totals)
            } else {
                (&mut counts.ctrl_alleles, &mut counts.ctrl_totals)
            };

            for (gene, pair) in self.genes.iter().zip(row.iter()) {
                let typed: Vec<&AlleleId> = pair.iter().flatten().collect();
                match model {
                    EncodingModel::Allelic => {
                        if typed.is_empty() {
                            continue;
                        }
                        *totals.entry(gene.clone()).or_insert(0) += typed.len() as u64;
                        for a in typed {
                            *alleles.entry(a.clone()).or_insert(0) += 1;
                        }
                    }
                    EncodingModel::Dominant => {
                        if typed.is_empty() {
                            continue;
                        }
                        *totals.entry(gene.clone()).or_insert(0) += 1;
                        let carried: BTreeSet<&AlleleId> = typed.into_iter().collect();
                        for a in carried {
                            *alleles.entry(a.clone()).or_insert(0) += 1;
                        }
                    }
                    EncodingModel::Recessive => {
                        if typed.len() < 2 {
                            continue;
                        }
                        *totals.entry(gene.clone()).or_insert(0) += 1;
                        if typed[0] == typed[1] {
                            *alleles.entry(typed[0].clone()).or_insert(0) += 1;
                        }
                    }
                }
            }
        }

        counts
    }
}

impl AlleleCounter for GenotypeTable {
    fn observed(&self, model: EncodingModel) -> Result<CohortCounts> {
        Ok(self.count_with_labels(model, &self.is_case))
    }

    fn permuted(&self, model: EncodingModel, rng: &mut dyn RngCore) -> Result<CohortCounts> {
        let mut labels = self.is_case.clone();
        labels.shuffle(rng);
        Ok(self.count_with_labels(model, &labels))
    }
}

/// Strip pair suffixes such as `A_1`, `A.2` from a gene column header.
fn gene_from_header(header: &str) -> &str {
    for suffix in ["_1", "_2", ".1", ".2"] {
        if let Some(stripped) = header.strip_suffix(suffix) {
            return stripped;
        }
    }
    header
}

fn parse_phenotype(s: &str) -> Result<Option<bool>> {
    match s {
        "2" => Ok(Some(true)),
        "1" => Ok(Some(false)),
        "0" | "-9" | "NA" => Ok(None),
        _ => bail!("Unrecognised phenotype '{}' (expected 1, 2, 0, -9 or NA)", s),
    }
}

fn parse_allele(token: &str, gene: &str, digits: usize) -> Result<Option<AlleleId>> {
    if MISSING_ALLELE.contains(&token) {
        return Ok(None);
    }
    let allele = AlleleId::parse_with_gene(token, gene)?;
    if allele.gene != gene {
        bail!("Allele '{}' found in a {} column", token, gene);
    }
    Ok(Some(allele.at_resolution(digits)))
}

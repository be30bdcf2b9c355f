//! Salaried-individual tax slabs per tax year

/// One marginal band. `upper_bound` of `None` means the band is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxSlab {
    pub upper_bound: Option<u64>,
    pub rate: f64,
}

impl TaxSlab {
    const fn bounded(upper_bound: u64, rate: f64) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    const fn unbounded(rate: f64) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}

/// Tax year used when a caller asks for a year with no table
pub const DEFAULT_TAX_YEAR: &str = "2024-2025";

const SLABS_2022_2023: &[TaxSlab] = &[
    TaxSlab::bounded(600_000, 0.0),
    TaxSlab::bounded(1_200_000, 0.025),
    TaxSlab::bounded(2_400_000, 0.125),
    TaxSlab::bounded(3_600_000, 0.20),
    TaxSlab::bounded(6_000_000, 0.25),
    TaxSlab::unbounded(0.325),
];

const SLABS_2023_2024: &[TaxSlab] = &[
    TaxSlab::bounded(600_000, 0.0),
    TaxSlab::bounded(1_200_000, 0.025),
    TaxSlab::bounded(2_400_000, 0.125),
    TaxSlab::bounded(3_600_000, 0.225),
    TaxSlab::bounded(6_000_000, 0.275),
    TaxSlab::unbounded(0.35),
];

// Same bands as 2023-2024; the filing portal still computes 2024-2025 returns on them.
const SLABS_2024_2025: &[TaxSlab] = SLABS_2023_2024;

const SLABS_2025_2026: &[TaxSlab] = &[
    TaxSlab::bounded(600_000, 0.0),
    TaxSlab::bounded(1_200_000, 0.01),
    TaxSlab::bounded(2_200_000, 0.11),
    TaxSlab::bounded(3_200_000, 0.23),
    TaxSlab::bounded(4_100_000, 0.30),
    TaxSlab::unbounded(0.35),
];

const TABLE: &[(&str, &[TaxSlab])] = &[
    ("2022-2023", SLABS_2022_2023),
    ("2023-2024", SLABS_2023_2024),
    ("2024-2025", SLABS_2024_2025),
    ("2025-2026", SLABS_2025_2026),
];

/// Slabs for `tax_year`, falling back to the default year
pub fn slabs_for(tax_year: &str) -> &'static [TaxSlab] {
    TABLE
        .iter()
        .find(|(year, _)| *year == tax_year)
        .map(|(_, slabs)| *slabs)
        .unwrap_or(SLABS_2024_2025)
}

const TAX_YEARS: &[&str] = &["2022-2023", "2023-2024", "2024-2025", "2025-2026"];

/// Tax years with a slab table, oldest first
pub fn available_tax_years() -> &'static [&'static str] {
    TAX_YEARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_strictly_increasing_bounds() {
        for (year, slabs) in TABLE {
            let bounds: Vec<u64> = slabs.iter().filter_map(|s| s.upper_bound).collect();
            assert!(
                bounds.windows(2).all(|w| w[0] < w[1]),
                "bounds not increasing for {year}"
            );
        }
    }

    #[test]
    fn test_every_table_ends_unbounded() {
        for (year, slabs) in TABLE {
            let (last, rest) = slabs.split_last().unwrap();
            assert!(last.upper_bound.is_none(), "{year} has a bounded last slab");
            assert!(rest.iter().all(|s| s.upper_bound.is_some()));
        }
    }

    #[test]
    fn test_every_table_has_non_decreasing_rates() {
        for (year, slabs) in TABLE {
            assert!(
                slabs.windows(2).all(|w| w[0].rate <= w[1].rate),
                "rates decrease for {year}"
            );
        }
    }

    #[test]
    fn test_unknown_year_falls_back_to_default() {
        assert_eq!(slabs_for("1999-2000"), slabs_for(DEFAULT_TAX_YEAR));
    }

    #[test]
    fn test_year_list_matches_table() {
        let table_years: Vec<&str> = TABLE.iter().map(|(year, _)| *year).collect();
        assert_eq!(available_tax_years(), table_years.as_slice());
    }

    #[test]
    fn test_available_tax_years_contains_default() {
        assert!(available_tax_years().contains(&DEFAULT_TAX_YEAR));
    }
}

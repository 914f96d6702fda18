//! Exact test of Hardy-Weinberg equilibrium for a biallelic variant, after
//! Wigginton, Cutler and Abecasis (2005), "A Note on Exact Tests of
//! Hardy-Weinberg Equilibrium", Am. J. Hum. Genet. 76:887-893.

use crate::core::{consensus::CombinedRecord, qc::GenotypeCounts};

/// Two-sided exact HWE p-value for the observed heterozygote and homozygote
/// counts. The homozygote classes may be given in either order. With no
/// genotypes at all the test is uninformative and returns 1.
pub fn hwe_exact_p_value(het: u64, hom1: u64, hom2: u64) -> f64 {
    let (hom_common, hom_rare) = if hom2 > hom1 { (hom2, hom1) } else { (hom1, hom2) };

    let rare_copies = (2 * hom_rare + het) as usize;
    let genotypes = (het + hom_common + hom_rare) as usize;
    if genotypes == 0 {
        return 1.0;
    }

    let mut het_probs = vec![0.0f64; rare_copies + 1];

    // start at the expected heterozygote count, matched to the parity of rare_copies
    let mut mid = rare_copies * (2 * genotypes - rare_copies) / (2 * genotypes);
    if (rare_copies & 1) ^ (mid & 1) != 0 {
        mid += 1;
    }

    let start_homr = (rare_copies - mid) / 2;
    let start_homc = genotypes - mid - start_homr;

    het_probs[mid] = 1.0;
    let mut sum = 1.0;

    let mut curr_homr = start_homr as f64;
    let mut curr_homc = start_homc as f64;
    let mut curr_hets = mid;
    while curr_hets > 1 {
        let hets = curr_hets as f64;
        het_probs[curr_hets - 2] =
            het_probs[curr_hets] * hets * (hets - 1.0) / (4.0 * (curr_homr + 1.0) * (curr_homc + 1.0));
        sum += het_probs[curr_hets - 2];
        // two fewer heterozygotes: one more rare and one more common homozygote
        curr_homr += 1.0;
        curr_homc += 1.0;
        curr_hets -= 2;
    }

    let mut curr_homr = start_homr as f64;
    let mut curr_homc = start_homc as f64;
    let mut curr_hets = mid;
    while curr_hets + 2 <= rare_copies {
        let hets = curr_hets as f64;
        het_probs[curr_hets + 2] =
            het_probs[curr_hets] * 4.0 * curr_homr * curr_homc / ((hets + 2.0) * (hets + 1.0));
        sum += het_probs[curr_hets + 2];
        curr_homr -= 1.0;
        curr_homc -= 1.0;
        curr_hets += 2;
    }

    for prob in het_probs.iter_mut() {
        *prob /= sum;
    }

    let observed = het_probs[het as usize];
    let p_value: f64 = het_probs.iter().filter(|&&p| p <= observed).sum();
    p_value.min(1.0)
}

/// HWE p-value for a combined record, re-calling every sample at `threshold`.
pub fn hwe_exact_for_record(record: &CombinedRecord, threshold: f64) -> f64 {
    let counts = GenotypeCounts::from_record(record, threshold);
    hwe_exact_p_value(counts.het, counts.hom_ref, counts.hom_alt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::VcfRecord;
    use approx::assert_abs_diff_eq;

    #[test]
    fn near_equilibrium_is_not_rejected() {
        assert!(hwe_exact_p_value(50, 25, 25) > 0.9);
        assert!(hwe_exact_p_value(48, 27, 25) > 0.5);
    }

    #[test]
    fn homozygote_order_does_not_matter() {
        assert_abs_diff_eq!(
            hwe_exact_p_value(21, 68, 11),
            hwe_exact_p_value(21, 11, 68),
            epsilon = 1e-12
        );
    }

    #[test]
    fn monomorphic_sample_is_in_equilibrium() {
        assert_abs_diff_eq!(hwe_exact_p_value(0, 50, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn heterozygote_deficit_is_rejected() {
        assert!(hwe_exact_p_value(0, 50, 50) < 1e-20);
        assert!(hwe_exact_p_value(10, 45, 45) < 1e-10);
    }

    #[test]
    fn heterozygote_excess_is_rejected() {
        assert!(hwe_exact_p_value(100, 0, 0) < 1e-20);
    }

    #[test]
    fn single_het_is_certain() {
        // one individual, one rare copy: only one configuration is possible
        assert_abs_diff_eq!(hwe_exact_p_value(1, 0, 0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn known_reference_value() {
        // 100 genotypes, 57 het / 14 AA / 29 BB
        let p = hwe_exact_p_value(57, 14, 29);
        assert!(p > 0.1 && p < 0.3, "p = {p}");
    }

    #[test]
    fn empty_counts_return_one() {
        assert_abs_diff_eq!(hwe_exact_p_value(0, 0, 0), 1.0);
    }

    #[test]
    fn record_wrapper_uses_recalled_genotypes() {
        let line = "1\t10\trs1\tA\tG\t.\t.\t.\tGT:GP:AT\t0/0:1,0,0:A\t0/1:0,1,0:A\t1/1:0,0,1:A\t.";
        let record = VcfRecord::decode(line).unwrap();
        let combined = CombinedRecord {
            position: record.position,
            prefix: record.prefix,
            genotypes: record.samples,
        };
        let expected = hwe_exact_p_value(1, 1, 1);
        assert_abs_diff_eq!(hwe_exact_for_record(&combined, 0.9), expected, epsilon = 1e-12);
    }
}

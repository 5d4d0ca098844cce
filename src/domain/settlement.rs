use crate::{
    common::money::Money,
    domain::{balance::Balances, member::MemberId},
};

/// A suggested direct payment settling part of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

struct Party<'a> {
    id: &'a MemberId,
    remaining: Money,
}

/// Reduces balances to a short list of direct transfers.
///
/// Balances are rounded to cents; anything within one cent of zero is treated
/// as settled. Debtors and creditors are each sorted largest first (ties keep
/// balance order) and the largest remaining debtor always pays the largest
/// remaining creditor as much as both can absorb. The output is in the order
/// the transfers were matched, which is also the order they are presented in.
///
/// # Examples
///
/// ```
/// use roomie_ledger::common::money::Money;
/// use roomie_ledger::domain::balance::Balances;
/// use roomie_ledger::domain::member::MemberId;
/// use roomie_ledger::domain::settlement::simplify_debts;
///
/// let balances: Balances = [
///     (MemberId::new("a"), Money::from_cents(6_000)),
///     (MemberId::new("b"), Money::from_cents(-3_000)),
///     (MemberId::new("c"), Money::from_cents(-3_000)),
/// ]
/// .into_iter()
/// .collect();
///
/// let transfers = simplify_debts(&balances);
/// assert_eq!(transfers.len(), 2);
/// assert_eq!(transfers[0].from.as_str(), "b");
/// assert_eq!(transfers[1].from.as_str(), "c");
/// ```
pub fn simplify_debts(balances: &Balances) -> Vec<Transfer> {
    let threshold = Money::cent();
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();

    for (id, balance) in balances.iter() {
        let rounded = balance.round_to_cents();
        if rounded < -threshold {
            debtors.push(Party {
                id,
                remaining: rounded.abs(),
            });
        } else if rounded > threshold {
            creditors.push(Party {
                id,
                remaining: rounded,
            });
        }
    }

    // Stable sorts: equal amounts stay in balance order.
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];
        let amount = debtor.remaining.min(creditor.remaining);

        if amount.is_positive() {
            transfers.push(Transfer {
                from: debtor.id.clone(),
                to: creditor.id.clone(),
                amount: amount.round_to_cents(),
            });
        }

        debtor.remaining -= amount;
        creditor.remaining -= amount;

        if debtor.remaining < threshold {
            i += 1;
        }
        if creditor.remaining < threshold {
            j += 1;
        }
    }

    transfers
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    fn balances(entries: &[(&str, &str)]) -> Balances {
        entries
            .iter()
            .map(|(id, amount)| (MemberId::new(*id), Money::from_str(amount).unwrap()))
            .collect()
    }

    fn triples(transfers: &[Transfer]) -> Vec<(&str, &str, String)> {
        transfers
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str(), t.amount.to_string_2dp()))
            .collect()
    }

    #[rstest]
    #[case::one_creditor_two_debtors(
        &[("a", "60"), ("b", "-30"), ("c", "-30")],
        vec![("b", "a", "30.00"), ("c", "a", "30.00")]
    )]
    #[case::largest_pairs_first(
        &[("a", "-10"), ("b", "-50"), ("c", "45"), ("d", "15")],
        vec![("b", "c", "45.00"), ("b", "d", "5.00"), ("a", "d", "10.00")]
    )]
    #[case::below_threshold_is_settled(
        &[("a", "0.005"), ("b", "-0.005")],
        vec![]
    )]
    #[case::exactly_one_cent_is_settled(
        &[("a", "0.01"), ("b", "-0.01")],
        vec![]
    )]
    #[case::all_zero(&[("a", "0"), ("b", "0")], vec![])]
    #[case::rounds_before_matching(
        &[("a", "10.004"), ("b", "-10.004")],
        vec![("b", "a", "10.00")]
    )]
    #[case::one_debtor_many_creditors(
        &[("a", "-90"), ("b", "30"), ("c", "60")],
        vec![("a", "c", "60.00"), ("a", "b", "30.00")]
    )]
    fn simplifies(#[case] input: &[(&str, &str)], #[case] expected: Vec<(&str, &str, &str)>) {
        let transfers = simplify_debts(&balances(input));
        let expected: Vec<(&str, &str, String)> = expected
            .into_iter()
            .map(|(f, t, a)| (f, t, a.to_string()))
            .collect();
        assert_eq!(triples(&transfers), expected);
    }

    #[test]
    fn transfers_cover_all_credit() {
        let input = balances(&[
            ("a", "25.50"),
            ("b", "-13.25"),
            ("c", "40"),
            ("d", "-52.25"),
        ]);

        let transfers = simplify_debts(&input);
        let paid: Money = transfers.iter().map(|t| t.amount).sum();

        assert_eq!(paid, Money::from_str("65.50").unwrap());
        assert!(transfers.iter().all(|t| t.amount.is_positive()));
    }

    #[test]
    fn output_is_stable_for_same_input() {
        let input = balances(&[("a", "-20"), ("b", "-20"), ("c", "20"), ("d", "20")]);

        let first = simplify_debts(&input);
        let second = simplify_debts(&input);

        assert_eq!(first, second);
        assert_eq!(
            triples(&first),
            vec![
                ("a", "c", "20.00".to_string()),
                ("b", "d", "20.00".to_string())
            ]
        );
    }
}

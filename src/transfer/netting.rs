//! Turns member balances into the payments that settle them.

use std::cmp::Reverse;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{balance::Balance, database_id::ParticipantId};

/// The number of decimal places amounts are settled to.
pub const CURRENCY_SCALE: u32 = 2;

/// A payment of `amount` from one member to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// The member who underpaid.
    pub from: ParticipantId,
    /// The member who overpaid.
    pub to: ParticipantId,
    /// How much to pay. Always positive.
    pub amount: Decimal,
}

/// Round each balance to [CURRENCY_SCALE] decimal places.
///
/// An equal share rarely divides evenly (e.g. 10 between 3 members), so the
/// rounded balances may not sum to zero. The difference is added to the
/// member with the largest absolute balance, picking the lowest participant
/// ID on ties, which makes the rounded balances sum to exactly zero.
pub fn quantize_balances(balances: &[Balance]) -> Vec<Balance> {
    let mut rounded: Vec<Balance> = balances
        .iter()
        .map(|balance| Balance {
            net_owed: balance
                .net_owed
                .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
            ..balance.clone()
        })
        .collect();

    let residual: Decimal = -rounded.iter().map(|balance| balance.net_owed).sum::<Decimal>();
    if residual.is_zero() {
        return rounded;
    }

    let absorber = rounded
        .iter_mut()
        .max_by_key(|balance| (balance.net_owed.abs(), Reverse(balance.participant_id)));

    if let Some(balance) = absorber {
        tracing::debug!(
            "participant {} absorbs a rounding difference of {residual}",
            balance.participant_id
        );
        balance.net_owed += residual;
    }

    rounded
}

/// Work out the payments that settle `balances`.
///
/// Balances are first rounded with [quantize_balances]. Members who owe money
/// (debtors) are then matched with members who are owed money (creditors),
/// both in ascending participant ID order. Each debtor pays the current
/// creditor as much as either side allows and moves on to the next creditor
/// only once the current one has been paid in full. Members with a zero
/// balance are not part of any payment.
///
/// The result has at most `debtors + creditors - 1` settlements and the
/// amount paid by debtors equals the amount received by creditors.
pub fn net_debts(balances: &[Balance]) -> Vec<Settlement> {
    let balances = quantize_balances(balances);

    let mut debtors: Vec<(ParticipantId, Decimal)> = balances
        .iter()
        .filter(|balance| balance.net_owed > Decimal::ZERO)
        .map(|balance| (balance.participant_id, balance.net_owed))
        .collect();
    debtors.sort_by_key(|(participant_id, _)| *participant_id);

    let mut creditors: Vec<(ParticipantId, Decimal)> = balances
        .iter()
        .filter(|balance| balance.net_owed < Decimal::ZERO)
        .map(|balance| (balance.participant_id, -balance.net_owed))
        .collect();
    creditors.sort_by_key(|(participant_id, _)| *participant_id);

    let mut settlements = Vec::with_capacity((debtors.len() + creditors.len()).saturating_sub(1));
    let mut creditor_index = 0;

    for (debtor, mut debt) in debtors {
        while debt > Decimal::ZERO {
            let Some((creditor, credit)) = creditors.get_mut(creditor_index) else {
                // Unreachable once balances sum to zero.
                tracing::error!("participant {debtor} still owes {debt} after all credit was used");
                break;
            };

            let amount = debt.min(*credit);
            settlements.push(Settlement {
                from: debtor,
                to: *creditor,
                amount,
            });

            debt -= amount;
            *credit -= amount;

            if credit.is_zero() {
                creditor_index += 1;
            }
        }
    }

    settlements
}


#[cfg(test)]
mod net_debts_tests {
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        balance::{Balance, calculate_balances, test_utils::test_expense},
        database_id::ParticipantId,
    };

    use super::{Settlement, net_debts, quantize_balances};

    fn settlements(expected: &[(ParticipantId, ParticipantId, Decimal)]) -> Vec<Settlement> {
        expected
            .iter()
            .map(|(from, to, amount)| Settlement {
                from: *from,
                to: *to,
                amount: *amount,
            })
            .collect()
    }

    fn balances_for(spent: &[(ParticipantId, Decimal)]) -> Vec<Balance> {
        let expenses: Vec<_> = spent
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(participant_id, amount)| test_expense(*participant_id, *amount))
            .collect();
        let members: Vec<_> = spent.iter().map(|(participant_id, _)| *participant_id).collect();

        calculate_balances(&expenses, &members).unwrap()
    }

    #[rstest]
    #[case::two_members(
        &[(1, dec!(56)), (2, dec!(1))],
        &[(2, 1, dec!(27.5))]
    )]
    #[case::zero_spend_member(
        &[(1, dec!(10)), (2, dec!(0))],
        &[(2, 1, dec!(5))]
    )]
    #[case::one_creditor_two_debtors(
        &[(1, dec!(90)), (2, dec!(0)), (3, dec!(0))],
        &[(2, 1, dec!(30)), (3, 1, dec!(30))]
    )]
    #[case::two_creditors_two_debtors(
        &[(1, dec!(60)), (2, dec!(30)), (3, dec!(0)), (4, dec!(0))],
        &[(3, 1, dec!(22.5)), (4, 1, dec!(15)), (4, 2, dec!(7.5))]
    )]
    #[case::one_debtor_two_creditors(
        &[(1, dec!(40)), (2, dec!(40)), (3, dec!(10))],
        &[(3, 1, dec!(10)), (3, 2, dec!(10))]
    )]
    #[case::uneven_split(
        &[(1, dec!(10)), (2, dec!(0)), (3, dec!(0))],
        &[(2, 1, dec!(3.33)), (3, 1, dec!(3.33))]
    )]
    #[case::everyone_even(
        &[(1, dec!(15)), (2, dec!(15))],
        &[]
    )]
    #[case::nobody_spent(
        &[(1, dec!(0)), (2, dec!(0)), (3, dec!(0))],
        &[]
    )]
    fn produces_expected_settlements(
        #[case] spent: &[(ParticipantId, Decimal)],
        #[case] expected: &[(ParticipantId, ParticipantId, Decimal)],
    ) {
        let got = net_debts(&balances_for(spent));

        assert_eq!(got, settlements(expected));
    }

    #[test]
    fn multiple_creditors_never_overpay() {
        let balances = balances_for(&[
            (1, dec!(90)),
            (2, dec!(0)),
            (3, dec!(0)),
            (4, dec!(70)),
            (5, dec!(0)),
        ]);

        let got = net_debts(&balances);

        for settlement in &got {
            let debt = balances
                .iter()
                .find(|balance| balance.participant_id == settlement.from)
                .unwrap()
                .net_owed;
            assert!(settlement.amount <= debt, "{settlement:?} pays more than {debt}");
        }
    }

    #[rstest]
    #[case(&[(1, dec!(90)), (2, dec!(0)), (3, dec!(0))])]
    #[case(&[(1, dec!(60)), (2, dec!(30)), (3, dec!(0)), (4, dec!(0))])]
    #[case(&[(1, dec!(10)), (2, dec!(0)), (3, dec!(0))])]
    #[case(&[(1, dec!(12.34)), (2, dec!(56.78)), (3, dec!(9.01)), (4, dec!(0)), (5, dec!(100))])]
    #[case(&[(7, dec!(1)), (3, dec!(2)), (5, dec!(4)), (1, dec!(8)), (2, dec!(16)), (4, dec!(32))])]
    fn conserves_money(#[case] spent: &[(ParticipantId, Decimal)]) {
        let balances = balances_for(spent);
        let quantized = quantize_balances(&balances);
        let total_debt: Decimal = quantized
            .iter()
            .map(|balance| balance.net_owed.max(Decimal::ZERO))
            .sum();

        let got = net_debts(&balances);

        let total_paid: Decimal = got.iter().map(|settlement| settlement.amount).sum();
        assert_eq!(total_paid, total_debt);

        for balance in &quantized {
            let paid: Decimal = got
                .iter()
                .filter(|settlement| settlement.from == balance.participant_id)
                .map(|settlement| settlement.amount)
                .sum();
            let received: Decimal = got
                .iter()
                .filter(|settlement| settlement.to == balance.participant_id)
                .map(|settlement| settlement.amount)
                .sum();

            assert_eq!(
                balance.net_owed - paid + received,
                Decimal::ZERO,
                "participant {} is not settled by {got:?}",
                balance.participant_id
            );
        }

        let debtors = quantized.iter().filter(|b| b.net_owed > Decimal::ZERO).count();
        let creditors = quantized.iter().filter(|b| b.net_owed < Decimal::ZERO).count();
        assert!(got.len() <= (debtors + creditors).saturating_sub(1));
    }

    #[test]
    fn amounts_are_always_positive() {
        let balances = balances_for(&[(1, dec!(0.01)), (2, dec!(0)), (3, dec!(0))]);

        let got = net_debts(&balances);

        assert!(got.iter().all(|settlement| settlement.amount > Decimal::ZERO));
    }
}

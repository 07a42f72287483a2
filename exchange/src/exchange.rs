//! Deposit and redemption against the vault.

use crate::error::ExchangeError;
use crate::reserve::ReserveBook;
use coffer_ledger::AccrualLedger;
use coffer_types::{Amount, HolderAddress, Rate, Timestamp};

/// Result of a deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositOutcome {
    pub deposited: Amount,
    /// Interest folded into the holder's principal before the mint landed.
    pub interest_realized: Amount,
    /// The rate the holder is locked at from now on.
    pub locked_rate: Rate,
}

/// Result of a redemption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedeemOutcome {
    /// The resolved payout (the whole-balance sentinel resolves here).
    pub redeemed: Amount,
    pub interest_realized: Amount,
}

/// The exchange front-end: 1:1 conversion between the reserve asset and
/// ledger units, with the vault as counterparty.
///
/// Redemption is indivisible. Every way the payout could fail is checked
/// before the burn, so a holder can never end up with units burned and no
/// reserve in hand.
pub struct ReserveExchange {
    vault: HolderAddress,
}

impl ReserveExchange {
    pub fn new(vault: HolderAddress) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &HolderAddress {
        &self.vault
    }

    /// Deposit `amount` of the reserve asset; the holder is minted the same
    /// number of units, locked at the current global rate.
    pub fn deposit(
        &self,
        ledger: &mut AccrualLedger,
        reserve: &mut ReserveBook,
        holder: &HolderAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<DepositOutcome, ExchangeError> {
        if holder == &self.vault {
            return Err(ExchangeError::VaultOperation);
        }
        if amount.is_zero() {
            return Err(ExchangeError::ZeroDeposit);
        }
        let available = reserve.balance_of(holder);
        if available < amount {
            return Err(ExchangeError::InsufficientReserve {
                needed: amount,
                available,
            });
        }
        reserve
            .balance_of(&self.vault)
            .checked_add(amount)
            .ok_or(ExchangeError::Overflow)?;

        // The mint is all-or-nothing; the reserve move after it cannot fail.
        let mint = ledger.mint(holder, amount, now)?;
        reserve.transfer(holder, &self.vault, amount)?;
        Ok(DepositOutcome {
            deposited: amount,
            interest_realized: mint.interest_realized,
            locked_rate: mint.locked_rate,
        })
    }

    /// Redeem `amount` units for the reserve asset. `Amount::MAX` redeems the
    /// holder's entire current balance, accrued interest included.
    ///
    /// An insufficient unit balance is reported before an underfunded vault:
    /// the holder learns about their own shortfall first.
    pub fn redeem(
        &self,
        ledger: &mut AccrualLedger,
        reserve: &mut ReserveBook,
        holder: &HolderAddress,
        amount: Amount,
        now: Timestamp,
    ) -> Result<RedeemOutcome, ExchangeError> {
        if holder == &self.vault {
            return Err(ExchangeError::VaultOperation);
        }
        let balance = ledger.balance_of_checked(holder, now)?;
        let payout = if amount.is_max() { balance } else { amount };
        if balance < payout {
            return Err(coffer_ledger::LedgerError::InsufficientBalance {
                needed: payout,
                available: balance,
            }
            .into());
        }
        let vault_reserve = reserve.balance_of(&self.vault);
        if vault_reserve < payout {
            return Err(ExchangeError::PayoutFailure {
                needed: payout,
                available: vault_reserve,
            });
        }
        reserve
            .balance_of(holder)
            .checked_add(payout)
            .ok_or(ExchangeError::Overflow)?;

        // The burn materializes against the same `now`, so it removes exactly
        // the balance resolved above; the payout after it cannot fail.
        let burn = ledger.burn(holder, payout, now)?;
        reserve.transfer(&self.vault, holder, payout)?;
        Ok(RedeemOutcome {
            redeemed: payout,
            interest_realized: burn.interest_realized,
        })
    }

    /// Move reserve from an external funder into the vault. This is how
    /// accrued interest becomes redeemable; the exchange never mints reserve.
    pub fn top_up(
        &self,
        reserve: &mut ReserveBook,
        from: &HolderAddress,
        amount: Amount,
    ) -> Result<(), ExchangeError> {
        if from == &self.vault {
            return Err(ExchangeError::VaultOperation);
        }
        reserve.transfer(from, &self.vault, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_types::RATE_SCALE;

    const ONE_PCT_PER_SEC: u64 = (RATE_SCALE / 100) as u64;

    fn addr(n: u8) -> HolderAddress {
        HolderAddress::new(format!("cfr_{n:0>8}"))
    }

    fn vault() -> HolderAddress {
        HolderAddress::new("cfr_vault")
    }

    fn setup(holder_reserve: u128) -> (ReserveExchange, AccrualLedger, ReserveBook) {
        let exchange = ReserveExchange::new(vault());
        let ledger = AccrualLedger::new(Rate::new(ONE_PCT_PER_SEC));
        let mut reserve = ReserveBook::new();
        reserve
            .credit(&addr(1), Amount::new(holder_reserve))
            .unwrap();
        (exchange, ledger, reserve)
    }

    #[test]
    fn test_deposit_mints_one_to_one_and_moves_reserve() {
        let (exchange, mut ledger, mut reserve) = setup(1_000_000);
        let alice = addr(1);

        let outcome = exchange
            .deposit(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::new(1_000_000),
                Timestamp::new(0),
            )
            .unwrap();
        assert_eq!(outcome.deposited, Amount::new(1_000_000));
        assert_eq!(outcome.locked_rate, Rate::new(ONE_PCT_PER_SEC));
        assert_eq!(
            ledger.balance_of(&alice, Timestamp::new(0)),
            Amount::new(1_000_000)
        );
        assert_eq!(reserve.balance_of(&alice), Amount::ZERO);
        assert_eq!(reserve.balance_of(&vault()), Amount::new(1_000_000));
    }

    #[test]
    fn test_zero_deposit_is_rejected() {
        let (exchange, mut ledger, mut reserve) = setup(1_000_000);
        let result = exchange.deposit(
            &mut ledger,
            &mut reserve,
            &addr(1),
            Amount::ZERO,
            Timestamp::new(0),
        );
        assert!(matches!(result, Err(ExchangeError::ZeroDeposit)));
    }

    #[test]
    fn test_deposit_beyond_reserve_is_rejected() {
        let (exchange, mut ledger, mut reserve) = setup(100);
        let result = exchange.deposit(
            &mut ledger,
            &mut reserve,
            &addr(1),
            Amount::new(5_000),
            Timestamp::new(0),
        );
        match result.unwrap_err() {
            ExchangeError::InsufficientReserve { needed, available } => {
                assert_eq!(needed, Amount::new(5_000));
                assert_eq!(available, Amount::new(100));
            }
            other => panic!("expected InsufficientReserve, got {other:?}"),
        }
        // Nothing minted, nothing moved.
        assert_eq!(ledger.balance_of(&addr(1), Timestamp::new(0)), Amount::ZERO);
        assert_eq!(reserve.balance_of(&addr(1)), Amount::new(100));
    }

    #[test]
    fn test_immediate_redemption_is_neutral() {
        let (exchange, mut ledger, mut reserve) = setup(1_000_000);
        let alice = addr(1);
        let now = Timestamp::new(0);

        exchange
            .deposit(&mut ledger, &mut reserve, &alice, Amount::new(1_000_000), now)
            .unwrap();
        let outcome = exchange
            .redeem(&mut ledger, &mut reserve, &alice, Amount::MAX, now)
            .unwrap();

        // Exactly the deposit comes back; no time passed, no interest owed.
        assert_eq!(outcome.redeemed, Amount::new(1_000_000));
        assert_eq!(reserve.balance_of(&alice), Amount::new(1_000_000));
        assert_eq!(reserve.balance_of(&vault()), Amount::ZERO);
        assert_eq!(ledger.balance_of(&alice, now), Amount::ZERO);
    }

    #[test]
    fn test_deferred_redemption_pays_interest_after_top_up() {
        let (exchange, mut ledger, mut reserve) = setup(1_000_000);
        let alice = addr(1);
        let funder = addr(7);
        reserve.credit(&funder, Amount::new(2_000_000)).unwrap();

        exchange
            .deposit(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::new(1_000_000),
                Timestamp::new(0),
            )
            .unwrap();

        // 100s at 1%/s doubles the balance. The vault only holds the original
        // deposit, so the interest must be funded before it can be redeemed.
        exchange
            .top_up(&mut reserve, &funder, Amount::new(1_000_000))
            .unwrap();
        let outcome = exchange
            .redeem(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::MAX,
                Timestamp::new(100),
            )
            .unwrap();

        assert_eq!(outcome.redeemed, Amount::new(2_000_000));
        assert_eq!(outcome.interest_realized, Amount::new(1_000_000));
        assert!(outcome.redeemed > Amount::new(1_000_000));
        assert_eq!(reserve.balance_of(&alice), Amount::new(2_000_000));
        assert_eq!(reserve.balance_of(&vault()), Amount::ZERO);
        assert_eq!(ledger.balance_of(&alice, Timestamp::new(100)), Amount::ZERO);
    }

    #[test]
    fn test_underfunded_vault_fails_without_burning() {
        let (exchange, mut ledger, mut reserve) = setup(1_000_000);
        let alice = addr(1);

        exchange
            .deposit(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::new(1_000_000),
                Timestamp::new(0),
            )
            .unwrap();

        let result = exchange.redeem(
            &mut ledger,
            &mut reserve,
            &alice,
            Amount::MAX,
            Timestamp::new(100),
        );
        match result.unwrap_err() {
            ExchangeError::PayoutFailure { needed, available } => {
                assert_eq!(needed, Amount::new(2_000_000));
                assert_eq!(available, Amount::new(1_000_000));
            }
            other => panic!("expected PayoutFailure, got {other:?}"),
        }

        // The failed redemption burned nothing and moved nothing; the claim
        // keeps accruing and is still redeemable later.
        assert_eq!(
            ledger.balance_of(&alice, Timestamp::new(100)),
            Amount::new(2_000_000)
        );
        assert_eq!(reserve.balance_of(&alice), Amount::ZERO);
        assert_eq!(reserve.balance_of(&vault()), Amount::new(1_000_000));
    }

    #[test]
    fn test_own_shortfall_reported_before_vault_shortfall() {
        let (exchange, mut ledger, mut reserve) = setup(100);
        let alice = addr(1);
        exchange
            .deposit(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::new(100),
                Timestamp::new(0),
            )
            .unwrap();

        // Both alice (100) and the vault (100) are short of 500; alice's own
        // balance is the error that surfaces.
        let result = exchange.redeem(
            &mut ledger,
            &mut reserve,
            &alice,
            Amount::new(500),
            Timestamp::new(0),
        );
        assert!(matches!(
            result,
            Err(ExchangeError::Ledger(
                coffer_ledger::LedgerError::InsufficientBalance { .. }
            ))
        ));
    }

    #[test]
    fn test_sentinel_redeem_on_empty_holder_is_a_noop() {
        let (exchange, mut ledger, mut reserve) = setup(0);
        let outcome = exchange
            .redeem(
                &mut ledger,
                &mut reserve,
                &addr(1),
                Amount::MAX,
                Timestamp::new(50),
            )
            .unwrap();
        assert_eq!(outcome.redeemed, Amount::ZERO);
    }

    #[test]
    fn test_top_up_requires_funder_reserve() {
        let (exchange, _ledger, mut reserve) = setup(0);
        let result = exchange.top_up(&mut reserve, &addr(3), Amount::new(50));
        assert!(matches!(
            result,
            Err(ExchangeError::InsufficientReserve { .. })
        ));
    }

    #[test]
    fn test_vault_cannot_act_as_holder() {
        let (exchange, mut ledger, mut reserve) = setup(0);
        let v = vault();
        assert!(matches!(
            exchange.deposit(&mut ledger, &mut reserve, &v, Amount::new(1), Timestamp::new(0)),
            Err(ExchangeError::VaultOperation)
        ));
        assert!(matches!(
            exchange.redeem(&mut ledger, &mut reserve, &v, Amount::new(1), Timestamp::new(0)),
            Err(ExchangeError::VaultOperation)
        ));
        assert!(matches!(
            exchange.top_up(&mut reserve, &v, Amount::new(1)),
            Err(ExchangeError::VaultOperation)
        ));
    }

    #[test]
    fn test_partial_redemption_leaves_remainder_accruing() {
        let (exchange, mut ledger, mut reserve) = setup(1_000_000);
        let alice = addr(1);
        exchange
            .deposit(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::new(1_000_000),
                Timestamp::new(0),
            )
            .unwrap();

        // Redeem only part of the doubled balance; the vault can cover it.
        let outcome = exchange
            .redeem(
                &mut ledger,
                &mut reserve,
                &alice,
                Amount::new(800_000),
                Timestamp::new(100),
            )
            .unwrap();
        assert_eq!(outcome.redeemed, Amount::new(800_000));
        assert_eq!(outcome.interest_realized, Amount::new(1_000_000));
        assert_eq!(ledger.principal_of(&alice), Amount::new(1_200_000));
        assert_eq!(reserve.balance_of(&alice), Amount::new(800_000));
        assert_eq!(reserve.balance_of(&vault()), Amount::new(200_000));
    }
}

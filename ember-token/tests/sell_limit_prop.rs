//! Property tests for the sell-limit window.

use proptest::prelude::*;

use ember_shared_types::Address;
use ember_token::TokenLedger;

fn dummy_address(seed: u8) -> Address {
    Address([seed; 32])
}

proptest! {
    /// Within one window, the accepted pool sells can never add up to
    /// more than 10% of the seller's starting balance: the limit is
    /// recomputed against the shrinking balance, so it only tightens.
    #[test]
    fn pool_sells_never_exceed_initial_limit(
        balance in 1_000u64..1_000_000,
        amounts in proptest::collection::vec(1u64..100_000, 1..20),
    ) {
        let _ = env_logger::builder().is_test(true).try_init();
        let admin = dummy_address(1);
        let seller = dummy_address(2);
        let pool = dummy_address(3);
        let mut ledger = TokenLedger::new(admin);
        ledger.mint(&admin, seller, balance).unwrap();
        ledger.set_liquidity_pool(&admin, pool, true).unwrap();

        let mut accepted = 0u64;
        for amount in amounts {
            if ledger.transfer(0, seller, pool, amount).is_ok() {
                accepted += amount;
            }
        }

        prop_assert!(accepted <= balance / 10);
        let sold = ledger
            .policy()
            .sell_tracker(&seller)
            .map(|t| t.sold_in_window)
            .unwrap_or(0);
        prop_assert_eq!(sold, accepted);
        prop_assert_eq!(ledger.balance_of(&seller), balance - accepted);
        prop_assert_eq!(ledger.balance_of(&pool), accepted);
    }
}

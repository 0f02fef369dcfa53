#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reward_ledger::ledger::{Account, RewardLedger};
use reward_ledger::ContractError;

const USERS: usize = 4;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Fund { amount: i128, duration: u32 },
    Stake { user: u8, amount: i128 },
    Withdraw { user: u8, amount: i128 },
    Claim { user: u8 },
    Exit { user: u8 },
    Advance { seconds: u32 },
}

// Drives the engine directly with unbounded amounts. Arithmetic must either
// succeed or report `ArithmeticOverflow`; it must never panic or wrap, and a
// failed call must leave the ledger untouched.
fuzz_target!(|actions: Vec<FuzzAction>| {
    let mut ledger = RewardLedger::default();
    let mut accounts = vec![Account::default(); USERS];
    let mut now = 0u64;

    for action in actions {
        let before = ledger.state().clone();
        let result: Result<(), ContractError> = match action {
            FuzzAction::Fund { amount, duration } => {
                ledger.fund(amount, u64::from(duration), now)
            }
            FuzzAction::Stake { user, amount } => ledger
                .stake(&mut accounts[user as usize % USERS], amount, now)
                .map(|_| ()),
            FuzzAction::Withdraw { user, amount } => ledger
                .withdraw(&mut accounts[user as usize % USERS], amount, now)
                .map(|_| ()),
            FuzzAction::Claim { user } => ledger
                .claim(&mut accounts[user as usize % USERS], now)
                .map(|_| ()),
            FuzzAction::Exit { user } => ledger
                .exit(&mut accounts[user as usize % USERS], now)
                .map(|_| ()),
            FuzzAction::Advance { seconds } => {
                now = now.saturating_add(u64::from(seconds));
                Ok(())
            }
        };

        if result.is_err() {
            assert_eq!(ledger.state(), &before, "failed call mutated the ledger");
        }

        let sum = accounts
            .iter()
            .try_fold(0i128, |acc, a| acc.checked_add(a.staked))
            .expect("stakes fit because total_staked is checked");
        assert_eq!(ledger.state().total_staked, sum);
        assert!(accounts.iter().all(|a| a.staked >= 0 && a.reward_debt >= 0));
    }
});

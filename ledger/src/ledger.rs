//! The vote ledger: chain, tally and voted set behind one lock.
//!
//! Mining never runs under the lock. `record_vote` validates and snapshots
//! the chain tip, mines outside the lock, then re-locks to re-check the
//! voter and the tip before committing. If another vote was appended in the
//! meantime the block is rebuilt on the new tip and mined again, up to
//! [`MAX_COMMIT_ATTEMPTS`] times.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ballot_types::{BlockHash, Clock};
use ballot_work::{CancelToken, WorkDifficulty, WorkError, WorkGenerator};

use crate::block::{Block, SealedBlock, Transaction};
use crate::error::{IntegrityError, LedgerError};
use crate::genesis::{create_genesis_block, validate_slate};
use crate::integrity::verify_blocks;
use crate::tally::Tally;

/// Mine-and-commit rounds before a vote gives up on a busy chain.
pub const MAX_COMMIT_ATTEMPTS: u32 = 64;

struct ChainState {
    chain: Vec<SealedBlock>,
    tally: Tally,
    voted: HashSet<String>,
}

impl ChainState {
    /// Index and digest of the last sealed block.
    fn tip(&self) -> (u64, BlockHash) {
        self.chain
            .last()
            .map(|b| (b.block.index, b.hash))
            .unwrap_or((0, BlockHash::ZERO))
    }
}

/// Append-only ledger of sealed vote blocks.
///
/// Safe to share across sessions behind an `Arc`; all mutation of the chain,
/// the tally and the voted set happens inside one critical section, so a
/// recorded vote and its tally increment are observed together or not at all.
pub struct Ledger {
    candidates: Vec<String>,
    difficulty: WorkDifficulty,
    clock: Arc<dyn Clock>,
    generator: WorkGenerator,
    state: Mutex<ChainState>,
}

impl Ledger {
    /// Create a ledger for `candidates` and seal its genesis block.
    pub fn new(
        candidates: Vec<String>,
        difficulty: WorkDifficulty,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        validate_slate(&candidates)?;

        let generator = WorkGenerator;
        let genesis = create_genesis_block(&candidates, clock.now());
        let genesis = seal(&generator, genesis, difficulty, 0, &CancelToken::new())?;
        tracing::info!(
            hash = %genesis.hash,
            nonce = genesis.block.nonce,
            candidates = candidates.len(),
            "genesis block sealed"
        );

        let state = ChainState {
            chain: vec![genesis],
            tally: Tally::new(&candidates),
            voted: HashSet::new(),
        };

        Ok(Self {
            candidates,
            difficulty,
            clock,
            generator,
            state: Mutex::new(state),
        })
    }

    /// Record `transaction` as a new sealed block.
    pub fn record_vote(&self, transaction: Transaction) -> Result<SealedBlock, LedgerError> {
        self.record_vote_with_cancel(transaction, &CancelToken::new())
    }

    /// Record `transaction`, abandoning the nonce search if `cancel` fires.
    ///
    /// Rejections, checked in order: the voter has already voted, the choice
    /// is not on the slate, the voter id is empty. A cancelled search leaves
    /// the ledger untouched, as does losing the tip race
    /// [`MAX_COMMIT_ATTEMPTS`] times in a row.
    pub fn record_vote_with_cancel(
        &self,
        transaction: Transaction,
        cancel: &CancelToken,
    ) -> Result<SealedBlock, LedgerError> {
        let _span = tracing::info_span!("record_vote", voter = %transaction.voter_id).entered();
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(WorkError::Cancelled.into());
            }
            if attempt == MAX_COMMIT_ATTEMPTS {
                tracing::warn!(attempts = attempt, "vote abandoned: chain tip kept moving");
                return Err(LedgerError::Contended { attempts: attempt });
            }
            attempt += 1;

            let (tip_index, tip_hash) = {
                let state = self.lock_state();
                if let Err(e) = self.validate(&state, &transaction) {
                    tracing::info!(reason = %e, "vote rejected");
                    return Err(e);
                }
                state.tip()
            };

            let block = Block {
                index: tip_index + 1,
                timestamp: self.clock.now(),
                prev_hash: tip_hash,
                transactions: vec![transaction.clone()],
                candidate_slate: self.candidates.clone(),
                nonce: 0,
            };
            let sealed = seal(&self.generator, block, self.difficulty, 0, cancel)?;

            let mut state = self.lock_state();
            if state.voted.contains(&transaction.voter_id) {
                tracing::info!("vote rejected: a concurrent session recorded this voter first");
                return Err(LedgerError::AlreadyVoted {
                    voter_id: transaction.voter_id,
                });
            }
            if state.tip() != (tip_index, tip_hash) {
                tracing::debug!(attempt, "chain tip moved while mining, re-mining on new tip");
                continue;
            }

            state.voted.insert(transaction.voter_id.clone());
            let counted = state.tally.increment(&transaction.candidate_choice);
            debug_assert!(counted, "validated candidate missing from tally");
            state.chain.push(sealed.clone());

            tracing::info!(
                index = sealed.block.index,
                hash = %sealed.hash,
                nonce = sealed.block.nonce,
                attempt,
                "vote block sealed"
            );
            return Ok(sealed);
        }
    }

    /// Seal `block` by searching nonces from zero.
    pub fn mine(&self, block: Block, cancel: &CancelToken) -> Result<SealedBlock, LedgerError> {
        self.mine_from(block, 0, cancel)
    }

    /// Seal `block` by searching nonces upward from `start_nonce`.
    ///
    /// The result is not appended; only [`Ledger::record_vote`] extends the chain.
    pub fn mine_from(
        &self,
        block: Block,
        start_nonce: u64,
        cancel: &CancelToken,
    ) -> Result<SealedBlock, LedgerError> {
        seal(&self.generator, block, self.difficulty, start_nonce, cancel)
    }

    /// Snapshot of the vote counts.
    pub fn tally(&self) -> Tally {
        self.lock_state().tally.clone()
    }

    /// Every transaction in chain order.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.lock_state()
            .chain
            .iter()
            .flat_map(|b| b.block.transactions.iter().cloned())
            .collect()
    }

    /// Snapshot of the sealed chain, genesis first.
    pub fn blocks(&self) -> Vec<SealedBlock> {
        self.lock_state().chain.clone()
    }

    /// Number of sealed blocks, genesis included.
    pub fn len(&self) -> usize {
        self.lock_state().chain.len()
    }

    /// Always false: the genesis block is sealed at construction.
    pub fn is_empty(&self) -> bool {
        self.lock_state().chain.is_empty()
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.lock_state().voted.contains(voter_id)
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Candidate at a 1-based menu position.
    pub fn candidate_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.candidates.get(i))
            .map(String::as_str)
    }

    pub fn difficulty(&self) -> WorkDifficulty {
        self.difficulty
    }

    /// Re-derive every link and seal in the chain.
    pub fn verify_chain_integrity(&self) -> Result<(), IntegrityError> {
        let blocks = self.blocks();
        let result = verify_blocks(&blocks, self.difficulty);
        if let Err(e) = &result {
            tracing::warn!(violation = %e, "ledger integrity check failed");
        }
        result
    }

    pub fn is_chain_valid(&self) -> bool {
        self.verify_chain_integrity().is_ok()
    }

    fn validate(&self, state: &ChainState, tx: &Transaction) -> Result<(), LedgerError> {
        if state.voted.contains(&tx.voter_id) {
            return Err(LedgerError::AlreadyVoted {
                voter_id: tx.voter_id.clone(),
            });
        }
        if !self.candidates.iter().any(|c| *c == tx.candidate_choice) {
            return Err(LedgerError::InvalidCandidate {
                candidate: tx.candidate_choice.clone(),
            });
        }
        if tx.voter_id.is_empty() {
            return Err(LedgerError::InvalidVoterId);
        }
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn seal(
    generator: &WorkGenerator,
    mut block: Block,
    difficulty: WorkDifficulty,
    start_nonce: u64,
    cancel: &CancelToken,
) -> Result<SealedBlock, LedgerError> {
    let solution = generator.generate(&block.canonical_prefix(), difficulty, start_nonce, cancel)?;
    block.nonce = solution.nonce;
    Ok(SealedBlock {
        block,
        hash: solution.hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_nullables::NullClock;
    use ballot_types::Timestamp;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{OnceLock, Weak};

    fn slate() -> Vec<String> {
        vec!["Candidate A".into(), "Candidate B".into(), "Candidate C".into()]
    }

    fn ledger() -> Ledger {
        Ledger::new(
            slate(),
            WorkDifficulty::new(1).unwrap(),
            Arc::new(NullClock::new(1_700_000_000)),
        )
        .unwrap()
    }

    #[test]
    fn genesis_is_sealed_at_construction() {
        let ledger = ledger();
        let blocks = ledger.blocks();
        assert_eq!(blocks.len(), 1);
        let genesis = &blocks[0];
        assert_eq!(genesis.block.index, 1);
        assert!(genesis.block.prev_hash.is_zero());
        assert!(genesis.block.transactions.is_empty());
        assert_eq!(genesis.block.candidate_slate, slate());
        assert_eq!(genesis.block.timestamp, Timestamp::new(1_700_000_000));
        assert!(ledger.difficulty().is_met_by(&genesis.hash));
    }

    #[test]
    fn rejects_bad_slates() {
        let clock = Arc::new(NullClock::new(0));
        assert!(matches!(
            Ledger::new(vec![], WorkDifficulty::NONE, clock.clone()),
            Err(LedgerError::EmptySlate)
        ));
        assert!(matches!(
            Ledger::new(vec!["A".into(), "A".into()], WorkDifficulty::NONE, clock),
            Err(LedgerError::DuplicateCandidate(_))
        ));
    }

    #[test]
    fn recorded_vote_links_to_previous_digest() {
        let ledger = ledger();
        let genesis_hash = ledger.blocks()[0].hash;
        let sealed = ledger
            .record_vote(Transaction::new("alice", "Candidate A"))
            .unwrap();
        assert_eq!(sealed.block.index, 2);
        assert_eq!(sealed.block.prev_hash, genesis_hash);
        assert_eq!(sealed.hash, sealed.block.compute_hash());
        assert_eq!(ledger.len(), 2);
        assert!(ledger.has_voted("alice"));
    }

    #[test]
    fn tally_increments_only_chosen_candidate() {
        let ledger = ledger();
        ledger
            .record_vote(Transaction::new("alice", "Candidate B"))
            .unwrap();
        let tally = ledger.tally();
        assert_eq!(tally.get("Candidate A"), 0);
        assert_eq!(tally.get("Candidate B"), 1);
        assert_eq!(tally.get("Candidate C"), 0);
    }

    #[test]
    fn double_vote_rejected_without_mutation() {
        let ledger = ledger();
        ledger
            .record_vote(Transaction::new("alice", "Candidate A"))
            .unwrap();
        let before_len = ledger.len();
        let before_tally = ledger.tally();

        let err = ledger
            .record_vote(Transaction::new("alice", "Candidate C"))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AlreadyVoted {
                voter_id: "alice".into()
            }
        );
        assert_eq!(ledger.len(), before_len);
        assert_eq!(ledger.tally(), before_tally);
    }

    #[test]
    fn invalid_candidate_and_voter_rejected() {
        let ledger = ledger();
        assert!(matches!(
            ledger.record_vote(Transaction::new("bob", "Nobody")),
            Err(LedgerError::InvalidCandidate { .. })
        ));
        assert_eq!(
            ledger.record_vote(Transaction::new("", "Candidate A")),
            Err(LedgerError::InvalidVoterId)
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn already_voted_checked_before_candidate() {
        let ledger = ledger();
        ledger
            .record_vote(Transaction::new("alice", "Candidate A"))
            .unwrap();
        assert!(matches!(
            ledger.record_vote(Transaction::new("alice", "Nobody")),
            Err(LedgerError::AlreadyVoted { .. })
        ));
    }

    #[test]
    fn all_transactions_in_chain_order() {
        let ledger = ledger();
        ledger.record_vote(Transaction::new("v1", "Candidate C")).unwrap();
        ledger.record_vote(Transaction::new("v2", "Candidate A")).unwrap();
        assert_eq!(
            ledger.all_transactions(),
            vec![
                Transaction::new("v1", "Candidate C"),
                Transaction::new("v2", "Candidate A"),
            ]
        );
    }

    #[test]
    fn cancelled_vote_leaves_ledger_untouched() {
        let ledger = ledger();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result =
            ledger.record_vote_with_cancel(Transaction::new("alice", "Candidate A"), &cancel);
        assert_eq!(result, Err(LedgerError::Work(WorkError::Cancelled)));
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.has_voted("alice"));
        assert_eq!(ledger.tally().total(), 0);

        // The voter can still vote once the cancelled attempt is gone.
        ledger
            .record_vote(Transaction::new("alice", "Candidate A"))
            .unwrap();
    }

    #[test]
    fn concurrent_votes_all_land_on_one_chain() {
        let ledger = Arc::new(ledger());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    ledger.record_vote(Transaction::new(format!("voter-{i}"), "Candidate A"))
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(ledger.len(), 9);
        assert_eq!(ledger.tally().get("Candidate A"), 8);
        assert_eq!(ledger.verify_chain_integrity(), Ok(()));
    }

    #[test]
    fn concurrent_double_vote_records_once() {
        let ledger = Arc::new(ledger());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    ledger.record_vote(Transaction::new("alice", "Candidate B"))
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(ledger.tally().get("Candidate B"), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn mine_from_respects_start() {
        let ledger = ledger();
        let block = create_genesis_block(&slate(), Timestamp::new(5));
        let sealed = ledger.mine_from(block, 500, &CancelToken::new()).unwrap();
        assert!(sealed.block.nonce >= 500);
        assert!(ledger.difficulty().is_met_by(&sealed.hash));
    }

    #[test]
    fn candidate_positions_are_one_based() {
        let ledger = ledger();
        assert_eq!(ledger.candidate_at(1), Some("Candidate A"));
        assert_eq!(ledger.candidate_at(3), Some("Candidate C"));
        assert_eq!(ledger.candidate_at(0), None);
        assert_eq!(ledger.candidate_at(4), None);
    }

    #[test]
    fn integrity_holds_after_votes() {
        let ledger = ledger();
        for voter in ["a", "b", "c"] {
            ledger.record_vote(Transaction::new(voter, "Candidate B")).unwrap();
        }
        assert_eq!(ledger.verify_chain_integrity(), Ok(()));
        assert!(ledger.is_chain_valid());
    }

    #[test]
    fn work_errors_convert() {
        let err: LedgerError = WorkError::Cancelled.into();
        assert_eq!(err, LedgerError::Work(WorkError::Cancelled));
    }

    #[test]
    fn cancel_is_honoured_without_mining() {
        let ledger = Ledger::new(slate(), WorkDifficulty::NONE, Arc::new(NullClock::new(0))).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(
            ledger.record_vote_with_cancel(Transaction::new("alice", "Candidate A"), &cancel),
            Err(LedgerError::Work(WorkError::Cancelled))
        );
        assert_eq!(ledger.len(), 1);
    }

    /// Clock that lands a rival vote every time the ledger stamps a block,
    /// so the stamped block's tip is always stale by commit time.
    #[derive(Default)]
    struct RivalClock {
        ledger: OnceLock<Weak<Ledger>>,
        busy: AtomicBool,
        rivals: AtomicU32,
    }

    impl Clock for RivalClock {
        fn now(&self) -> Timestamp {
            let ledger = self.ledger.get().and_then(Weak::upgrade);
            if let Some(ledger) = ledger {
                if !self.busy.swap(true, Ordering::SeqCst) {
                    let n = self.rivals.fetch_add(1, Ordering::SeqCst);
                    ledger
                        .record_vote(Transaction::new(format!("rival-{n}"), "Candidate B"))
                        .unwrap();
                    self.busy.store(false, Ordering::SeqCst);
                }
            }
            Timestamp::new(1_700_000_000)
        }
    }

    #[test]
    fn endlessly_moving_tip_gives_up() {
        let clock = Arc::new(RivalClock::default());
        let ledger = Arc::new(
            Ledger::new(slate(), WorkDifficulty::new(1).unwrap(), clock.clone()).unwrap(),
        );
        clock.ledger.set(Arc::downgrade(&ledger)).unwrap();

        assert_eq!(
            ledger.record_vote(Transaction::new("alice", "Candidate A")),
            Err(LedgerError::Contended {
                attempts: MAX_COMMIT_ATTEMPTS
            })
        );
        assert!(!ledger.has_voted("alice"));
        assert_eq!(ledger.tally().get("Candidate A"), 0);
        assert_eq!(ledger.tally().get("Candidate B"), MAX_COMMIT_ATTEMPTS as u64);
        assert_eq!(ledger.len(), 1 + MAX_COMMIT_ATTEMPTS as usize);
        assert_eq!(ledger.verify_chain_integrity(), Ok(()));
    }
}

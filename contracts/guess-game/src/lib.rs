#![no_std]

//! # Guess Game
//!
//! A stake-based multiplayer number-guessing game played on encrypted values.
//! Each player pays a fixed entry fee into escrow and submits an encrypted
//! guess in [1, 100]. The contract draws an encrypted target through the
//! confidential gateway and nobody, the contract included, sees any value
//! until a batched public decryption is answered by the KMS.
//!
//! ## Game flow
//! 1. `create_game` opens a lobby for 2-10 players.
//! 2. Players `join_game`, each transferring `ENTRY_FEE` into escrow.
//! 3. Once the lobby is full anyone may `start_game`: the gateway draws an
//!    encrypted random target in [1, 100].
//! 4. Each player `submit_guess`es a ciphertext handle plus the coprocessor's
//!    input proof, bound to (handle, game id, this contract, player).
//! 5. Once everyone guessed anyone may `end_game`: the handle batch
//!    `[target, guess_0, guess_1, …]` (join order) is queued for decryption.
//! 6. The KMS relayer answers through `decryption_callback` with the
//!    cleartexts and a KMS proof. The proof is verified by the gateway, the
//!    winner (closest guess) is fixed and the game is Finished.
//! 7. The winner `claim`s the whole pool exactly once.
//!
//! If the oracle stays silent, `reissue_decryption` re-queues the same batch
//! after `DECRYPTION_RETRY_LEDGERS`. Escrow stays locked until a verified
//! callback arrives.
//!
//! ## Cleartext encoding
//! One big-endian `u32` per handle, in batch order.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, token,
    Address, Bytes, BytesN, Env, Map, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvGameCreated {
    pub game_id: u32,
    pub creator: Address,
    pub max_players: u32,
}

#[contractevent]
pub struct EvPlayerJoined {
    pub game_id: u32,
    pub player: Address,
    pub prize_pool: i128,
}

#[contractevent]
pub struct EvGameStarted {
    pub game_id: u32,
    pub target_handle: BytesN<32>,
}

#[contractevent]
pub struct EvGuessSubmitted {
    pub game_id: u32,
    pub player: Address,
}

#[contractevent]
pub struct EvDecryptionRequested {
    pub game_id: u32,
    pub request_id: u64,
}

#[contractevent]
pub struct EvDecryptionCompleted {
    pub game_id: u32,
    pub clear_target: u32,
}

#[contractevent]
pub struct EvWinnerDecided {
    pub game_id: u32,
    pub winner: Address,
    pub prize: i128,
}

#[contractevent]
pub struct EvPrizeClaimed {
    pub game_id: u32,
    pub winner: Address,
    pub amount: i128,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  External trait interfaces
// ═══════════════════════════════════════════════════════════════════════════════

/// Confidential gateway: input admission, random draws, ACL and the
/// decryption oracle. The game acts as `app` in every call.
#[contractclient(name = "GatewayClient")]
pub trait GatewayInterface {
    fn register_input(
        env: Env,
        app: Address,
        user: Address,
        context: u32,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> bool;

    fn generate_random(env: Env, app: Address, min: u32, max: u32) -> BytesN<32>;

    fn request_decryption(env: Env, app: Address, handles: Vec<BytesN<32>>) -> u64;

    fn verify_decryption(
        env: Env,
        request_id: u64,
        handles: Vec<BytesN<32>>,
        cleartexts: Bytes,
        proof: Bytes,
    ) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum GuessGameError {
    GameNotFound = 1,
    InvalidConfig = 2,
    PhaseViolation = 3,
    AlreadyJoined = 4,
    GameFull = 5,
    InsufficientFee = 6,
    NotReady = 7,
    NotAPlayer = 8,
    AlreadyGuessed = 9,
    InvalidProof = 10,
    GuessesIncomplete = 11,
    UnknownRequest = 12,
    NotWinner = 13,
    AlreadyClaimed = 14,
    MalformedCleartexts = 15,
    AdminNotSet = 16,
    GatewayNotSet = 17,
    FeeTokenNotSet = 18,
    RetryTooSoon = 19,
    NotRevealed = 20,
    GuessNotSubmitted = 21,
    TargetNotDrawn = 22,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Game state & storage keys
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle phase. Only ever moves forward, one step at a time.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Phase {
    Lobby = 0,
    Started = 1,
    DecryptionPending = 2,
    Finished = 3,
}

/// Who wins when several guesses are equally close to the target.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TieBreakPolicy {
    FirstJoined = 0,
    LastJoined = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub creator: Address,
    /// Gateway holding this game's handles, fixed at creation.
    pub gateway: Address,
    pub max_players: u32,
    pub phase: Phase,
    /// Join order.
    pub players: Vec<Address>,
    pub encrypted_target: Option<BytesN<32>>,
    pub guesses: Map<Address, BytesN<32>>,
    // Oracle round-trip
    pub pending_request: Option<u64>,
    pub requested_ledger: Option<u32>,
    // Escrow
    pub prize_pool: i128,
    // Revealed on a verified callback
    pub clear_target: Option<u32>,
    pub clear_guesses: Map<Address, u32>,
    pub winner: Option<Address>,
    pub prize_claimed: bool,
}

/// Public summary returned by `get_game`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameView {
    pub creator: Address,
    pub max_players: u32,
    pub phase: Phase,
    pub player_count: u32,
    pub prize: i128,
    pub winner: Option<Address>,
    pub prize_claimed: bool,
    pub clear_target: Option<u32>,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    Gateway,
    FeeToken,
    NextGameId,
    TieBreak,
    Game(u32),
    /// Decryption request id → game id, present while the request is live.
    PendingRequest(u64),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// 0.001 of a 7-decimal asset.
pub const ENTRY_FEE: i128 = 10_000;

pub const MIN_PLAYERS: u32 = 2;
pub const MAX_PLAYERS: u32 = 10;

pub const MIN_GUESS: u32 = 1;
pub const MAX_GUESS: u32 = 100;

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Oracle silence tolerated before a re-request: ~1 hour
const DECRYPTION_RETRY_MINUTES: u32 = 60;
pub const DECRYPTION_RETRY_LEDGERS: u32 = DECRYPTION_RETRY_MINUTES * 60 / LEDGER_RATE_SECS;

// Games are kept as audit records: 120 days
const GAME_TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const GAME_TTL_LEDGERS: u32 = GAME_TTL_SECONDS / LEDGER_RATE_SECS;

const INSTANCE_TTL_LEDGERS: u32 = 30 * 24 * 60 * 60 / LEDGER_RATE_SECS;

const CLEARTEXT_WIDTH: u32 = 4;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct GuessGameContract;

#[contractimpl]
impl GuessGameContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor & Registry
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(env: Env, admin: Address, gateway: Address, fee_token: Address) {
        let storage = env.storage().instance();
        storage.set(&StorageKey::Admin, &admin);
        storage.set(&StorageKey::Gateway, &gateway);
        storage.set(&StorageKey::FeeToken, &fee_token);
        storage.set(&StorageKey::NextGameId, &0u32);
        storage.set(&StorageKey::TieBreak, &TieBreakPolicy::FirstJoined);
    }

    pub fn create_game(
        env: Env,
        creator: Address,
        max_players: u32,
    ) -> Result<u32, GuessGameError> {
        creator.require_auth();

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(GuessGameError::InvalidConfig);
        }

        let gateway = Self::load_gateway(&env)?;
        let game_id: u32 = env
            .storage()
            .instance()
            .get(&StorageKey::NextGameId)
            .unwrap_or(0);
        env.storage()
            .instance()
            .set(&StorageKey::NextGameId, &(game_id + 1));

        let game = Game {
            creator: creator.clone(),
            gateway,
            max_players,
            phase: Phase::Lobby,
            players: Vec::new(&env),
            encrypted_target: None,
            guesses: Map::new(&env),
            pending_request: None,
            requested_ledger: None,
            prize_pool: 0,
            clear_target: None,
            clear_guesses: Map::new(&env),
            winner: None,
            prize_claimed: false,
        };
        Self::write_game(&env, game_id, &game);

        EvGameCreated {
            game_id,
            creator,
            max_players,
        }
        .publish(&env);
        Ok(game_id)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Lobby
    // ───────────────────────────────────────────────────────────────────────────

    /// Join a lobby, moving exactly `ENTRY_FEE` of the fee token into escrow.
    pub fn join_game(
        env: Env,
        game_id: u32,
        player: Address,
        payment: i128,
    ) -> Result<(), GuessGameError> {
        player.require_auth();

        let mut game = Self::read_game(&env, game_id)?;
        Self::require_phase(&game, Phase::Lobby)?;
        if game.players.contains(&player) {
            return Err(GuessGameError::AlreadyJoined);
        }
        if game.players.len() >= game.max_players {
            return Err(GuessGameError::GameFull);
        }
        if payment != ENTRY_FEE {
            return Err(GuessGameError::InsufficientFee);
        }

        let fee_token = Self::load_fee_token(&env)?;
        token::Client::new(&env, &fee_token).transfer(
            &player,
            &env.current_contract_address(),
            &ENTRY_FEE,
        );

        game.players.push_back(player.clone());
        game.prize_pool += ENTRY_FEE;
        Self::write_game(&env, game_id, &game);

        EvPlayerJoined {
            game_id,
            player,
            prize_pool: game.prize_pool,
        }
        .publish(&env);
        Ok(())
    }

    /// Draw the encrypted target once the lobby is full. Anyone may call.
    pub fn start_game(env: Env, game_id: u32) -> Result<(), GuessGameError> {
        let mut game = Self::read_game(&env, game_id)?;
        Self::require_phase(&game, Phase::Lobby)?;
        if game.players.len() < game.max_players {
            return Err(GuessGameError::NotReady);
        }

        let gateway = GatewayClient::new(&env, &game.gateway);
        let target_handle =
            gateway.generate_random(&env.current_contract_address(), &MIN_GUESS, &MAX_GUESS);

        game.encrypted_target = Some(target_handle.clone());
        game.phase = Phase::Started;
        Self::write_game(&env, game_id, &game);

        EvGameStarted {
            game_id,
            target_handle,
        }
        .publish(&env);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Guessing
    // ───────────────────────────────────────────────────────────────────────────

    /// Submit an encrypted guess. `proof` is the coprocessor's input proof for
    /// `(handle, game_id, this contract, player)`; the gateway also grants the
    /// player access to their own handle.
    pub fn submit_guess(
        env: Env,
        game_id: u32,
        player: Address,
        handle: BytesN<32>,
        proof: Bytes,
    ) -> Result<(), GuessGameError> {
        player.require_auth();

        let mut game = Self::read_game(&env, game_id)?;
        Self::require_phase(&game, Phase::Started)?;
        if !game.players.contains(&player) {
            return Err(GuessGameError::NotAPlayer);
        }
        if game.guesses.contains_key(player.clone()) {
            return Err(GuessGameError::AlreadyGuessed);
        }

        // Any gateway failure, including a host trap on a malformed point,
        // counts as a rejected proof.
        let gateway = GatewayClient::new(&env, &game.gateway);
        let admitted = gateway.try_register_input(
            &env.current_contract_address(),
            &player,
            &game_id,
            &handle,
            &proof,
        );
        if !matches!(admitted, Ok(Ok(true))) {
            return Err(GuessGameError::InvalidProof);
        }

        game.guesses.set(player.clone(), handle);
        Self::write_game(&env, game_id, &game);

        EvGuessSubmitted { game_id, player }.publish(&env);
        Ok(())
    }

    /// Queue the whole game for public decryption. Anyone may call once every
    /// player has guessed.
    pub fn end_game(env: Env, game_id: u32) -> Result<u64, GuessGameError> {
        let mut game = Self::read_game(&env, game_id)?;
        Self::require_phase(&game, Phase::Started)?;
        if game.guesses.len() < game.players.len() {
            return Err(GuessGameError::GuessesIncomplete);
        }

        let request_id = Self::request_reveal(&env, game_id, &mut game)?;
        game.phase = Phase::DecryptionPending;
        Self::write_game(&env, game_id, &game);
        Ok(request_id)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Decryption oracle
    // ───────────────────────────────────────────────────────────────────────────

    /// KMS answer for a pending request. Anyone may relay it; the proof is
    /// the only thing trusted.
    pub fn decryption_callback(
        env: Env,
        request_id: u64,
        cleartexts: Bytes,
        proof: Bytes,
    ) -> Result<bool, GuessGameError> {
        let game_id: u32 = env
            .storage()
            .persistent()
            .get(&StorageKey::PendingRequest(request_id))
            .ok_or(GuessGameError::UnknownRequest)?;
        let mut game = Self::read_game(&env, game_id)?;
        if game.phase != Phase::DecryptionPending || game.pending_request != Some(request_id) {
            return Err(GuessGameError::UnknownRequest);
        }

        let handles = Self::decryption_batch(&env, &game)?;
        let gateway = GatewayClient::new(&env, &game.gateway);
        let verified = gateway.try_verify_decryption(&request_id, &handles, &cleartexts, &proof);
        if !matches!(verified, Ok(Ok(true))) {
            return Err(GuessGameError::InvalidProof);
        }

        let values = Self::decode_cleartexts(&env, &cleartexts, handles.len())?;
        let clear_target = values.get(0).ok_or(GuessGameError::MalformedCleartexts)?;
        if !(MIN_GUESS..=MAX_GUESS).contains(&clear_target) {
            return Err(GuessGameError::MalformedCleartexts);
        }

        // Guesses are not range-checked: a value outside [1, 100] is still a
        // legal answer and is ranked by distance like any other. It can never
        // beat the in-range value nearest to it.
        let mut clear_guesses = Map::new(&env);
        for (i, player) in game.players.iter().enumerate() {
            let guess = values
                .get(i as u32 + 1)
                .ok_or(GuessGameError::MalformedCleartexts)?;
            clear_guesses.set(player, guess);
        }

        let policy = Self::tie_break(&env);
        let winner = Self::resolve_winner(&game.players, &clear_guesses, clear_target, policy)
            .ok_or(GuessGameError::MalformedCleartexts)?;

        env.storage()
            .persistent()
            .remove(&StorageKey::PendingRequest(request_id));
        game.pending_request = None;
        game.clear_target = Some(clear_target);
        game.clear_guesses = clear_guesses;
        game.winner = Some(winner.clone());
        game.phase = Phase::Finished;
        Self::write_game(&env, game_id, &game);

        EvDecryptionCompleted {
            game_id,
            clear_target,
        }
        .publish(&env);
        EvWinnerDecided {
            game_id,
            winner,
            prize: game.prize_pool,
        }
        .publish(&env);
        Ok(true)
    }

    /// Re-queue the same batch when the oracle has been silent for
    /// `DECRYPTION_RETRY_LEDGERS`. The superseded request id stops being
    /// accepted by `decryption_callback`.
    pub fn reissue_decryption(env: Env, game_id: u32) -> Result<u64, GuessGameError> {
        let mut game = Self::read_game(&env, game_id)?;
        Self::require_phase(&game, Phase::DecryptionPending)?;

        let requested = game.requested_ledger.unwrap_or(0);
        if env.ledger().sequence() < requested.saturating_add(DECRYPTION_RETRY_LEDGERS) {
            return Err(GuessGameError::RetryTooSoon);
        }

        if let Some(stale) = game.pending_request {
            env.storage()
                .persistent()
                .remove(&StorageKey::PendingRequest(stale));
        }

        let request_id = Self::request_reveal(&env, game_id, &mut game)?;
        Self::write_game(&env, game_id, &game);
        Ok(request_id)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Payout
    // ───────────────────────────────────────────────────────────────────────────

    /// Pay the whole pool to the winner. Succeeds at most once per game.
    pub fn claim(env: Env, game_id: u32, caller: Address) -> Result<i128, GuessGameError> {
        caller.require_auth();

        let mut game = Self::read_game(&env, game_id)?;
        Self::require_phase(&game, Phase::Finished)?;
        if game.winner.as_ref() != Some(&caller) {
            return Err(GuessGameError::NotWinner);
        }
        if game.prize_claimed {
            return Err(GuessGameError::AlreadyClaimed);
        }

        let amount = game.prize_pool;
        game.prize_claimed = true;
        game.prize_pool = 0;
        Self::write_game(&env, game_id, &game);

        let fee_token = Self::load_fee_token(&env)?;
        token::Client::new(&env, &fee_token).transfer(
            &env.current_contract_address(),
            &caller,
            &amount,
        );

        EvPrizeClaimed {
            game_id,
            winner: caller,
            amount,
        }
        .publish(&env);
        Ok(amount)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read
    // ───────────────────────────────────────────────────────────────────────────

    pub fn next_game_id(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&StorageKey::NextGameId)
            .unwrap_or(0)
    }

    pub fn get_game(env: Env, game_id: u32) -> Result<GameView, GuessGameError> {
        let game = Self::read_game(&env, game_id)?;
        Ok(GameView {
            creator: game.creator,
            max_players: game.max_players,
            phase: game.phase,
            player_count: game.players.len(),
            prize: game.prize_pool,
            winner: game.winner,
            prize_claimed: game.prize_claimed,
            clear_target: game.clear_target,
        })
    }

    pub fn get_players(env: Env, game_id: u32) -> Result<Vec<Address>, GuessGameError> {
        Ok(Self::read_game(&env, game_id)?.players)
    }

    pub fn has_joined(env: Env, game_id: u32, player: Address) -> Result<bool, GuessGameError> {
        Ok(Self::read_game(&env, game_id)?.players.contains(&player))
    }

    pub fn has_submitted_guess(
        env: Env,
        game_id: u32,
        player: Address,
    ) -> Result<bool, GuessGameError> {
        Ok(Self::read_game(&env, game_id)?.guesses.contains_key(player))
    }

    pub fn all_guessed(env: Env, game_id: u32) -> Result<bool, GuessGameError> {
        let game = Self::read_game(&env, game_id)?;
        Ok(game.guesses.len() == game.players.len())
    }

    pub fn get_clear_guess(
        env: Env,
        game_id: u32,
        player: Address,
    ) -> Result<u32, GuessGameError> {
        let game = Self::read_game(&env, game_id)?;
        if game.phase != Phase::Finished {
            return Err(GuessGameError::NotRevealed);
        }
        game.clear_guesses
            .get(player)
            .ok_or(GuessGameError::NotAPlayer)
    }

    pub fn get_encrypted_guess(
        env: Env,
        game_id: u32,
        player: Address,
    ) -> Result<BytesN<32>, GuessGameError> {
        Self::read_game(&env, game_id)?
            .guesses
            .get(player)
            .ok_or(GuessGameError::GuessNotSubmitted)
    }

    pub fn get_encrypted_target(env: Env, game_id: u32) -> Result<BytesN<32>, GuessGameError> {
        Self::read_game(&env, game_id)?
            .encrypted_target
            .ok_or(GuessGameError::TargetNotDrawn)
    }

    pub fn get_pending_request(env: Env, game_id: u32) -> Result<Option<u64>, GuessGameError> {
        Ok(Self::read_game(&env, game_id)?.pending_request)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_admin(env: Env) -> Result<Address, GuessGameError> {
        Self::load_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), GuessGameError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::Admin, &new_admin);
        Ok(())
    }

    pub fn get_gateway(env: Env) -> Result<Address, GuessGameError> {
        Self::load_gateway(&env)
    }

    /// Gateway for games created from now on. Existing games keep the
    /// gateway that holds their handles and pending requests.
    pub fn set_gateway(env: Env, new_gateway: Address) -> Result<(), GuessGameError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage()
            .instance()
            .set(&StorageKey::Gateway, &new_gateway);
        Ok(())
    }

    pub fn get_fee_token(env: Env) -> Result<Address, GuessGameError> {
        Self::load_fee_token(&env)
    }

    pub fn get_tie_break_policy(env: Env) -> TieBreakPolicy {
        Self::tie_break(&env)
    }

    pub fn set_tie_break_policy(env: Env, policy: TieBreakPolicy) -> Result<(), GuessGameError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::TieBreak, &policy);
        Ok(())
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), GuessGameError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Decryption round-trip
    // ═══════════════════════════════════════════════════════════════════════════

    /// `[target, guess(players[0]), guess(players[1]), …]`
    fn decryption_batch(env: &Env, game: &Game) -> Result<Vec<BytesN<32>>, GuessGameError> {
        let target = game
            .encrypted_target
            .clone()
            .ok_or(GuessGameError::TargetNotDrawn)?;
        let mut handles = Vec::new(env);
        handles.push_back(target);
        for player in game.players.iter() {
            let guess = game
                .guesses
                .get(player)
                .ok_or(GuessGameError::GuessesIncomplete)?;
            handles.push_back(guess);
        }
        Ok(handles)
    }

    fn request_reveal(env: &Env, game_id: u32, game: &mut Game) -> Result<u64, GuessGameError> {
        let handles = Self::decryption_batch(env, game)?;
        let gateway = GatewayClient::new(env, &game.gateway);
        let request_id = gateway.request_decryption(&env.current_contract_address(), &handles);

        let key = StorageKey::PendingRequest(request_id);
        env.storage().persistent().set(&key, &game_id);
        env.storage()
            .persistent()
            .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);

        game.pending_request = Some(request_id);
        game.requested_ledger = Some(env.ledger().sequence());

        EvDecryptionRequested {
            game_id,
            request_id,
        }
        .publish(env);
        Ok(request_id)
    }

    fn decode_cleartexts(
        env: &Env,
        cleartexts: &Bytes,
        count: u32,
    ) -> Result<Vec<u32>, GuessGameError> {
        if cleartexts.len() != count * CLEARTEXT_WIDTH {
            return Err(GuessGameError::MalformedCleartexts);
        }
        let mut values = Vec::new(env);
        for i in 0..count {
            let mut word = [0u8; 4];
            for (j, byte) in word.iter_mut().enumerate() {
                *byte = cleartexts
                    .get(i * CLEARTEXT_WIDTH + j as u32)
                    .ok_or(GuessGameError::MalformedCleartexts)?;
            }
            values.push_back(u32::from_be_bytes(word));
        }
        Ok(values)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Winner selection
    // ═══════════════════════════════════════════════════════════════════════════

    /// Closest guess wins. Equal distances fall to the earliest joiner under
    /// `FirstJoined` and the latest under `LastJoined`.
    fn resolve_winner(
        players: &Vec<Address>,
        clear_guesses: &Map<Address, u32>,
        target: u32,
        policy: TieBreakPolicy,
    ) -> Option<Address> {
        let mut best: Option<(Address, u32)> = None;
        for player in players.iter() {
            let Some(guess) = clear_guesses.get(player.clone()) else {
                continue;
            };
            let distance = guess.abs_diff(target);
            let replace = match &best {
                None => true,
                Some((_, best_distance)) => match policy {
                    TieBreakPolicy::FirstJoined => distance < *best_distance,
                    TieBreakPolicy::LastJoined => distance <= *best_distance,
                },
            };
            if replace {
                best = Some((player, distance));
            }
        }
        best.map(|(player, _)| player)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Validation & Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn require_phase(game: &Game, expected: Phase) -> Result<(), GuessGameError> {
        if game.phase != expected {
            return Err(GuessGameError::PhaseViolation);
        }
        Ok(())
    }

    fn tie_break(env: &Env) -> TieBreakPolicy {
        env.storage()
            .instance()
            .get(&StorageKey::TieBreak)
            .unwrap_or(TieBreakPolicy::FirstJoined)
    }

    fn read_game(env: &Env, game_id: u32) -> Result<Game, GuessGameError> {
        env.storage()
            .persistent()
            .get(&StorageKey::Game(game_id))
            .ok_or(GuessGameError::GameNotFound)
    }

    fn write_game(env: &Env, game_id: u32, game: &Game) {
        let key = StorageKey::Game(game_id);
        env.storage().persistent().set(&key, game);
        env.storage()
            .persistent()
            .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
        // Keep instance storage (admin, gateway, fee token, counter) alive
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_LEDGERS, INSTANCE_TTL_LEDGERS);
    }

    fn load_admin(env: &Env) -> Result<Address, GuessGameError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(GuessGameError::AdminNotSet)
    }

    fn load_gateway(env: &Env) -> Result<Address, GuessGameError> {
        env.storage()
            .instance()
            .get(&StorageKey::Gateway)
            .ok_or(GuessGameError::GatewayNotSet)
    }

    fn load_fee_token(env: &Env) -> Result<Address, GuessGameError> {
        env.storage()
            .instance()
            .get(&StorageKey::FeeToken)
            .ok_or(GuessGameError::FeeTokenNotSet)
    }
}

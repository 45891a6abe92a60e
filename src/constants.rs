/// On-chain program identifiers the analyzer classifies against
pub mod programs {
    /// Native system program (plain wallets and uninitialized accounts)
    pub const SYSTEM: &str = "11111111111111111111111111111111";
    /// Legacy SPL Token program
    pub const TOKEN: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    /// Token-2022 (extended token) program
    pub const TOKEN_2022: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
    /// Token metadata program that owns the per-mint metadata side-record
    pub const METADATA: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";
    /// Pump.fun bonding-curve program (bootstrap launch program)
    pub const PUMP_FUN: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
    /// Raydium AMM authority (secondary market the bootstrap program graduates into)
    pub const RAYDIUM_AMM: &str = "EhhTKJ6M13fa4jc281HpdyiNpAHj8uvxymgZqGuDs9Jj";
}

/// Reserved authorities with special meaning
pub mod authorities {
    /// Update authority stamped on every mint created through Pump.fun.
    ///
    /// Seeing it is only a hint; the heuristic verifier decides whether the
    /// token really came out of the bootstrap program.
    pub const PUMP_FUN_UPDATE_AUTHORITY: &str = "TSLvdd1pWpHVjahSpsvCXUbgwsL3JAcvokwaKt1eokM";
}

/// Default upstream endpoints
pub mod endpoints {
    pub const SOLANA_MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";
    pub const RAYDIUM_API: &str = "https://api-v3.raydium.io";
}

/// Seed prefix of the metadata side-record PDA
pub const METADATA_SEED: &[u8] = b"metadata";

/// Sentinel used for undecodable display strings
pub const NOT_AVAILABLE: &str = "N/A";

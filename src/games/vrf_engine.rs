use crate::errors::OracleError;
use crate::games::request_tracker::RandomnessRequest;
use crate::games::types::{Address, RandomWord};
use schnorrkel::context::SigningContext;
use schnorrkel::{ExpansionMode, Keypair, MiniSecretKey, PublicKey, Signature};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const VRF_SIGNING_CONTEXT: &[u8] = b"roulette-ledger";

/// External source of randomness for pending requests.
///
/// The ledger never calls this itself; a driver (the CLI, a test) pulls
/// pending requests, asks the oracle and feeds the words back through
/// `receive_randomness` under the oracle's address.
pub trait RandomnessOracle {
    /// Caller identity the ledger authorises for callbacks
    fn address(&self) -> Address;

    fn fulfil(&self, request: &RandomnessRequest) -> Result<Vec<RandomWord>, OracleError>;
}

/// Random words for one request plus the proof that produced them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VrfFulfillment {
    pub request: RandomnessRequest,
    pub words: Vec<RandomWord>,
    pub proof: String,
    pub public_key: String,
    pub input_message: String,
}

/// Schnorrkel-backed oracle; the word is the hash of a signature over the request
#[derive(Clone)]
pub struct VrfOracle {
    keypair: Arc<Keypair>,
}

impl VrfOracle {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Create an oracle with a random keypair (for testing)
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        Self::new(MiniSecretKey::generate_with(OsRng).expand_to_keypair(ExpansionMode::Ed25519))
    }

    /// Deterministic keypair from a 32-byte mini secret
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, OracleError> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| OracleError::InvalidSeed(format!("{:?}", e)))?;
        Ok(Self::new(mini.expand_to_keypair(ExpansionMode::Ed25519)))
    }

    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, OracleError> {
        let bytes = hex::decode(seed_hex.strip_prefix("0x").unwrap_or(seed_hex))
            .map_err(|e| OracleError::InvalidSeed(format!("invalid hex: {}", e)))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| OracleError::InvalidSeed("seed must be 32 bytes".to_string()))?;
        Self::from_seed(&seed)
    }

    /// Address derived from the public key: first 20 bytes of its SHA-256
    pub fn address_for(public_key: &[u8; 32]) -> Address {
        let digest = Sha256::digest(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Address::new(bytes)
    }

    pub fn input_message(request: &RandomnessRequest) -> String {
        format!("{}:{}", request.request_id, request.bet_id)
    }

    /// Produce the random word and proof for a request
    pub fn generate(&self, request: &RandomnessRequest) -> Result<VrfFulfillment, OracleError> {
        let input_message = Self::input_message(request);

        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let signature = self.keypair.sign(ctx.bytes(input_message.as_bytes()));
        let signature_bytes = signature.to_bytes();

        let word: [u8; 32] = Sha256::digest(signature_bytes).into();

        Ok(VrfFulfillment {
            request: *request,
            words: vec![RandomWord::new(word)],
            proof: hex::encode(signature_bytes),
            public_key: self.public_key_hex(),
            input_message,
        })
    }

    /// Verify a fulfilment against the request it claims to answer
    pub fn verify(fulfillment: &VrfFulfillment, expected: &RandomnessRequest) -> Result<bool, OracleError> {
        let expected_input = Self::input_message(expected);
        if fulfillment.request != *expected || fulfillment.input_message != expected_input {
            return Ok(false);
        }

        let proof = hex::decode(&fulfillment.proof)
            .map_err(|e| OracleError::InvalidProof(format!("proof hex: {}", e)))?;
        let public_key_bytes = hex::decode(&fulfillment.public_key)
            .map_err(|e| OracleError::InvalidProof(format!("public key hex: {}", e)))?;

        let public_key = PublicKey::from_bytes(&public_key_bytes)
            .map_err(|e| OracleError::InvalidProof(format!("public key: {:?}", e)))?;
        let signature = Signature::from_bytes(&proof)
            .map_err(|e| OracleError::InvalidProof(format!("signature: {:?}", e)))?;

        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        if public_key
            .verify(ctx.bytes(expected_input.as_bytes()), &signature)
            .is_err()
        {
            return Ok(false);
        }

        let computed: [u8; 32] = Sha256::digest(&proof).into();
        Ok(fulfillment.words.first() == Some(&RandomWord::new(computed)))
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public.to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }
}

impl RandomnessOracle for VrfOracle {
    fn address(&self) -> Address {
        Self::address_for(&self.public_key())
    }

    fn fulfil(&self, request: &RandomnessRequest) -> Result<Vec<RandomWord>, OracleError> {
        Ok(self.generate(request)?.words)
    }
}

use crate::errors::VerificationError;
use crate::games::number_source::{Draw, NumberSource};
use crate::games::types::{Game, VRFBundle, MAX_GUESS};
use schnorrkel::{
    signing_context,
    vrf::{VRFInOut, VRFPreOut, VRFProof},
    Keypair, PublicKey,
};
use std::sync::Arc;

const VRF_SIGNING_CONTEXT: &[u8] = b"yolo-guess";

/// Label used to derive draw randomness from the VRF output
const VRF_OUTPUT_LABEL: &[u8] = b"yolo-guess-number";

/// VRF-based correct number generator
///
/// The VRF output depends only on the key and the game, so a given key
/// can produce exactly one number per game. The proof bytes are randomized
/// on every signing but all of them verify against the same output.
pub struct VRFGameEngine {
    keypair: Arc<Keypair>,
}

impl VRFGameEngine {
    /// Create a new VRF engine with a keypair
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Create a new VRF engine with a random keypair
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        let keypair = Keypair::generate_with(OsRng);
        Self::new(keypair)
    }

    /// Hex-encoded public key for external verification
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.keypair.public.to_bytes())
    }

    /// Deterministic VRF input for a game
    pub fn input_message(game: &Game) -> String {
        format!(
            "{}:guess:{}",
            game.id(),
            game.created_at().timestamp_millis()
        )
    }

    /// Generate a provably fair bundle for a game
    pub fn generate_outcome(&self, game: &Game) -> VRFBundle {
        self.sign_game(game).0
    }

    fn sign_game(&self, game: &Game) -> (VRFBundle, u8) {
        let input_message = Self::input_message(game);
        let transcript = signing_context(VRF_SIGNING_CONTEXT).bytes(input_message.as_bytes());
        let (inout, proof, _) = self.keypair.vrf_sign(transcript);

        let bundle = VRFBundle {
            vrf_output: hex::encode(inout.to_preout().to_bytes()),
            vrf_proof: hex::encode(proof.to_bytes()),
            public_key: self.public_key_hex(),
            input_message,
        };
        (bundle, Self::number_from_inout(&inout))
    }

    fn number_from_inout(inout: &VRFInOut) -> u8 {
        Self::compute_guess_number(&inout.make_bytes::<[u8; 32]>(VRF_OUTPUT_LABEL))
    }

    /// Map VRF randomness onto the guess range
    pub fn compute_guess_number(randomness: &[u8]) -> u8 {
        let mut head = [0u8; 8];
        let len = randomness.len().min(8);
        head[..len].copy_from_slice(&randomness[..len]);
        (u64::from_be_bytes(head) % (MAX_GUESS as u64 + 1)) as u8
    }

    /// Verify a VRF proof (public verification function)
    pub fn verify_vrf_proof(
        vrf_bundle: &VRFBundle,
        expected_input: &str,
    ) -> Result<bool, VerificationError> {
        Ok(Self::verified_inout(vrf_bundle, expected_input)?.is_some())
    }

    /// Checked VRF output, or `None` when the proof does not hold
    fn verified_inout(
        vrf_bundle: &VRFBundle,
        expected_input: &str,
    ) -> Result<Option<VRFInOut>, VerificationError> {
        if vrf_bundle.input_message != expected_input {
            return Ok(None);
        }

        let vrf_output = decode_hex("vrf_output", &vrf_bundle.vrf_output)?;
        let vrf_proof = decode_hex("vrf_proof", &vrf_bundle.vrf_proof)?;
        let public_key_bytes = decode_hex("public_key", &vrf_bundle.public_key)?;

        let public_key = PublicKey::from_bytes(&public_key_bytes)
            .map_err(|e| VerificationError::InvalidPublicKey(format!("{:?}", e)))?;
        let preout = VRFPreOut::from_bytes(&vrf_output)
            .map_err(|e| VerificationError::InvalidSignature(format!("{:?}", e)))?;
        let proof = VRFProof::from_bytes(&vrf_proof)
            .map_err(|e| VerificationError::InvalidSignature(format!("{:?}", e)))?;

        let transcript = signing_context(VRF_SIGNING_CONTEXT).bytes(expected_input.as_bytes());
        Ok(public_key
            .vrf_verify(transcript, &preout, &proof)
            .ok()
            .map(|(inout, _)| inout))
    }

    /// Verify the proof recorded on a settled game and that it yields its correct number
    pub fn verify_game(game: &Game) -> Result<bool, VerificationError> {
        let bundle = game
            .fairness()
            .ok_or_else(|| VerificationError::MissingProof(game.id().to_string()))?;

        match Self::verified_inout(bundle, &Self::input_message(game))? {
            Some(inout) => Ok(game.correct_number() == Some(Self::number_from_inout(&inout))),
            None => Ok(false),
        }
    }
}

impl NumberSource for VRFGameEngine {
    fn draw(&self, game: &Game) -> Draw {
        let (bundle, number) = self.sign_game(game);
        Draw {
            number,
            fairness: Some(bundle),
        }
    }

    fn name(&self) -> &'static str {
        "vrf"
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, VerificationError> {
    hex::decode(value).map_err(|e| VerificationError::InvalidHex {
        field,
        reason: e.to_string(),
    })
}

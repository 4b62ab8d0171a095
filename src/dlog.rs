//! Schnorr's proof of knowledge of a discrete log.
//!
//! The prover knows `w` with `h = g^w` and convinces the verifier of that
//! without revealing `w`:
//! **Step 1**: Prover samples `r` in `Z_q` and sends `a = g^r`.
//! **Step 2**: Verifier sends a random `t`-bit challenge `e`.
//! **Step 3**: Prover sends `z = r + e*w mod q`.
//! **Step 4**: Verifier accepts iff the group parameters are valid, `h` and
//! `a` are group members and `g^z = a * h^e`.
//!
//! The simulator picks `z` at random and solves for the commitment,
//! `a = g^z * h^-e`; since `(e, z)` pairs determine transcripts bijectively
//! in both directions, simulated and honest transcripts are identically
//! distributed.

use ark_std::rand::rngs::StdRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SigmaError;
use crate::group::PrimeOrderGroup;
use crate::input::{CommonInput, ProverInput};
use crate::message::{SigmaMessage, SimulatedTranscript};
use crate::{
    challenge_scalar, check_challenge_length, derive_rng, sample_challenge,
    validate_soundness_param, ProverComputation, Simulator, VerifierComputation,
};

/// Prover side. Holds `r` and a witness copy between the two rounds; both are
/// zeroized once the response is produced.
pub struct DlogProver<G: PrimeOrderGroup> {
    group: G,
    t: u32,
    rng: StdRng,
    round: Option<DlogRound<G>>,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct DlogRound<G: PrimeOrderGroup> {
    r: G::Scalar,
    witness: G::Scalar,
}

impl<G: PrimeOrderGroup> DlogProver<G> {
    pub fn new(group: G, t: u32, rng: StdRng) -> Result<Self, SigmaError> {
        validate_soundness_param(&group, t)?;
        Ok(Self {
            group,
            t,
            rng,
            round: None,
        })
    }
}

impl<G: PrimeOrderGroup> ProverComputation<G> for DlogProver<G> {
    fn compute_first_msg(
        &mut self,
        input: &ProverInput<G>,
    ) -> Result<SigmaMessage<G>, SigmaError> {
        let input = match input {
            ProverInput::Dlog(input) => input,
            _ => return Err(SigmaError::UnexpectedInput("discrete log prover input")),
        };
        let r = self.group.random_scalar(&mut self.rng);
        let commitment = self.group.exp(&self.group.generator(), &r);
        self.round = Some(DlogRound {
            r,
            witness: *input.witness(),
        });
        Ok(SigmaMessage::GroupElement(commitment))
    }

    fn compute_second_msg(&mut self, challenge: &[u8]) -> Result<SigmaMessage<G>, SigmaError> {
        check_challenge_length(challenge, self.t)?;
        let round = self
            .round
            .take()
            .ok_or(SigmaError::CommitmentNotGenerated)?;
        let e = challenge_scalar::<G::Scalar>(challenge);
        let z = round.r + e * round.witness;
        Ok(SigmaMessage::Scalar(z))
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }

    fn simulator(&mut self) -> Box<dyn Simulator<G> + Send> {
        Box::new(DlogSimulator {
            group: self.group.clone(),
            t: self.t,
            rng: derive_rng(&mut self.rng),
        })
    }
}

/// Verifier side. Holds the challenge between rounds.
pub struct DlogVerifier<G: PrimeOrderGroup> {
    group: G,
    t: u32,
    rng: StdRng,
    challenge: Option<Vec<u8>>,
}

impl<G: PrimeOrderGroup> DlogVerifier<G> {
    pub fn new(group: G, t: u32, rng: StdRng) -> Result<Self, SigmaError> {
        validate_soundness_param(&group, t)?;
        Ok(Self {
            group,
            t,
            rng,
            challenge: None,
        })
    }
}

impl<G: PrimeOrderGroup> VerifierComputation<G> for DlogVerifier<G> {
    fn sample_challenge(&mut self) -> Result<(), SigmaError> {
        self.challenge = Some(sample_challenge(&mut self.rng, self.t));
        Ok(())
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), SigmaError> {
        check_challenge_length(challenge, self.t)?;
        self.challenge = Some(challenge.to_vec());
        Ok(())
    }

    fn challenge(&self) -> Option<&[u8]> {
        self.challenge.as_deref()
    }

    fn verify(
        &self,
        input: &CommonInput<G>,
        a: &SigmaMessage<G>,
        z: &SigmaMessage<G>,
    ) -> Result<bool, SigmaError> {
        let input = match input {
            CommonInput::Dlog(input) => input,
            _ => return Err(SigmaError::UnexpectedInput("discrete log common input")),
        };
        let commitment = match a {
            SigmaMessage::GroupElement(el) => el,
            _ => return Err(SigmaError::UnexpectedMessage("a single group element")),
        };
        let response = match z {
            SigmaMessage::Scalar(s) => s,
            _ => return Err(SigmaError::UnexpectedMessage("a single scalar")),
        };
        let challenge = self.challenge.as_deref().ok_or(SigmaError::ChallengeNotSet)?;
        check_challenge_length(challenge, self.t)?;

        if !self.group.validate_parameters() {
            return Ok(false);
        }
        if !self.group.is_member(&input.h) || !self.group.is_member(commitment) {
            return Ok(false);
        }
        let e = challenge_scalar::<G::Scalar>(challenge);
        let lhs = self.group.exp(&self.group.generator(), response);
        let rhs = self
            .group
            .mul(commitment, &self.group.exp(&input.h, &e));
        Ok(lhs == rhs)
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }
}

/// Samples a random `z` and computes `a = g^z * h^-e`.
pub struct DlogSimulator<G: PrimeOrderGroup> {
    group: G,
    t: u32,
    rng: StdRng,
}

impl<G: PrimeOrderGroup> DlogSimulator<G> {
    pub fn new(group: G, t: u32, rng: StdRng) -> Result<Self, SigmaError> {
        validate_soundness_param(&group, t)?;
        Ok(Self { group, t, rng })
    }
}

impl<G: PrimeOrderGroup> Simulator<G> for DlogSimulator<G> {
    fn simulate_with_challenge(
        &mut self,
        input: &CommonInput<G>,
        challenge: &[u8],
    ) -> Result<SimulatedTranscript<G>, SigmaError> {
        let input = match input {
            CommonInput::Dlog(input) => input,
            _ => return Err(SigmaError::UnexpectedInput("discrete log common input")),
        };
        check_challenge_length(challenge, self.t)?;
        let z = self.group.random_scalar(&mut self.rng);
        let e = challenge_scalar::<G::Scalar>(challenge);
        let commitment = self.group.mul(
            &self.group.exp(&self.group.generator(), &z),
            &self.group.exp(&input.h, &(-e)),
        );
        Ok(SimulatedTranscript {
            first_message: SigmaMessage::GroupElement(commitment),
            challenge: challenge.to_vec(),
            second_message: SigmaMessage::Scalar(z),
        })
    }

    fn simulate(
        &mut self,
        input: &CommonInput<G>,
    ) -> Result<SimulatedTranscript<G>, SigmaError> {
        let challenge = sample_challenge(&mut self.rng, self.t);
        self.simulate_with_challenge(input, &challenge)
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }
}

//! Chaum-Pedersen proof that `(g, h, u, v)` is a Diffie-Hellman tuple.
//!
//! The prover knows `w` with `u = g^w` and `v = h^w`:
//! **Step 1**: Prover samples `r` in `Z_q` and sends `(a1, a2) = (g^r, h^r)`.
//! **Step 2**: Verifier sends a random `t`-bit challenge `e`.
//! **Step 3**: Prover sends `z = r + e*w mod q`.
//! **Step 4**: Verifier accepts iff the group parameters are valid, `h`, `a1`
//! and `a2` are group members and both `g^z = a1 * u^e` and `h^z = a2 * v^e`
//! hold.
//!
//! The same `z` answers for both bases, which is what ties the two discrete
//! logs together. The simulator samples `z` and solves for both commitments:
//! `a1 = g^z * u^-e`, `a2 = h^z * v^-e`.

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

/// Prover side. Holds `r` and a witness copy between the two rounds.
pub struct DhTupleProver<G: PrimeOrderGroup> {
    group: G,
    t: u32,
    rng: StdRng,
    round: Option<DhTupleRound<G>>,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct DhTupleRound<G: PrimeOrderGroup> {
    r: G::Scalar,
    witness: G::Scalar,
}

impl<G: PrimeOrderGroup> DhTupleProver<G> {
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

impl<G: PrimeOrderGroup> ProverComputation<G> for DhTupleProver<G> {
    fn compute_first_msg(
        &mut self,
        input: &ProverInput<G>,
    ) -> Result<SigmaMessage<G>, SigmaError> {
        let input = match input {
            ProverInput::DhTuple(input) => input,
            _ => return Err(SigmaError::UnexpectedInput("DH tuple prover input")),
        };
        let r = self.group.random_scalar(&mut self.rng);
        let a1 = self.group.exp(&self.group.generator(), &r);
        let a2 = self.group.exp(&input.common().h, &r);
        self.round = Some(DhTupleRound {
            r,
            witness: *input.witness(),
        });
        Ok(SigmaMessage::GroupElementPair(a1, a2))
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
        Box::new(DhTupleSimulator {
            group: self.group.clone(),
            t: self.t,
            rng: derive_rng(&mut self.rng),
        })
    }
}

/// Verifier side. Holds the challenge between rounds.
pub struct DhTupleVerifier<G: PrimeOrderGroup> {
    group: G,
    t: u32,
    rng: StdRng,
    challenge: Option<Vec<u8>>,
}

impl<G: PrimeOrderGroup> DhTupleVerifier<G> {
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

impl<G: PrimeOrderGroup> VerifierComputation<G> for DhTupleVerifier<G> {
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
            CommonInput::DhTuple(input) => input,
            _ => return Err(SigmaError::UnexpectedInput("DH tuple common input")),
        };
        let (a1, a2) = match a {
            SigmaMessage::GroupElementPair(a1, a2) => (a1, a2),
            _ => return Err(SigmaError::UnexpectedMessage("a pair of group elements")),
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
        if !self.group.is_member(&input.h)
            || !self.group.is_member(a1)
            || !self.group.is_member(a2)
        {
            return Ok(false);
        }
        let e = challenge_scalar::<G::Scalar>(challenge);
        let g_z = self.group.exp(&self.group.generator(), response);
        let h_z = self.group.exp(&input.h, response);
        let first = g_z == self.group.mul(a1, &self.group.exp(&input.u, &e));
        let second = h_z == self.group.mul(a2, &self.group.exp(&input.v, &e));
        Ok(first && second)
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }
}

/// Samples a random `z` and computes `a1 = g^z * u^-e`, `a2 = h^z * v^-e`.
pub struct DhTupleSimulator<G: PrimeOrderGroup> {
    group: G,
    t: u32,
    rng: StdRng,
}

impl<G: PrimeOrderGroup> DhTupleSimulator<G> {
    pub fn new(group: G, t: u32, rng: StdRng) -> Result<Self, SigmaError> {
        validate_soundness_param(&group, t)?;
        Ok(Self { group, t, rng })
    }
}

impl<G: PrimeOrderGroup> Simulator<G> for DhTupleSimulator<G> {
    fn simulate_with_challenge(
        &mut self,
        input: &CommonInput<G>,
        challenge: &[u8],
    ) -> Result<SimulatedTranscript<G>, SigmaError> {
        let input = match input {
            CommonInput::DhTuple(input) => input,
            _ => return Err(SigmaError::UnexpectedInput("DH tuple common input")),
        };
        check_challenge_length(challenge, self.t)?;
        let z = self.group.random_scalar(&mut self.rng);
        let e = challenge_scalar::<G::Scalar>(challenge);
        let minus_e = -e;
        let a1 = self.group.mul(
            &self.group.exp(&self.group.generator(), &z),
            &self.group.exp(&input.u, &minus_e),
        );
        let a2 = self.group.mul(
            &self.group.exp(&input.h, &z),
            &self.group.exp(&input.v, &minus_e),
        );
        Ok(SimulatedTranscript {
            first_message: SigmaMessage::GroupElementPair(a1, a2),
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

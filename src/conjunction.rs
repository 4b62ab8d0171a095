//! AND composition of sigma protocols.
//!
//! A vector of sub-protocols, all built for the same soundness parameter `t`,
//! runs as one three-move protocol: the first and second messages are the
//! ordered sequences of the sub-messages, and a single challenge is shared by
//! every conjunct. Sharing the challenge keeps the composed run at three
//! moves while preserving the soundness error `2^-t`.
//!
//! Sub-computations are trait objects, so any conforming protocol composes,
//! including another conjunction.

use ark_std::rand::rngs::StdRng;
use ark_std::vec::Vec;

use crate::error::SigmaError;
use crate::group::PrimeOrderGroup;
use crate::input::{CommonInput, ProverInput};
use crate::message::{SigmaMessage, SimulatedTranscript};
use crate::{
    check_challenge_length, derive_rng, sample_challenge, ProverComputation, Simulator,
    VerifierComputation,
};

/// Runs each sub-prover on its own input and concatenates the messages.
pub struct ConjunctionProver<G: PrimeOrderGroup> {
    provers: Vec<Box<dyn ProverComputation<G> + Send>>,
    t: u32,
    rng: StdRng,
}

impl<G: PrimeOrderGroup> ConjunctionProver<G> {
    /// Every sub-prover must report soundness parameter `t`.
    pub fn new(
        provers: Vec<Box<dyn ProverComputation<G> + Send>>,
        t: u32,
        rng: StdRng,
    ) -> Result<Self, SigmaError> {
        for prover in &provers {
            if prover.soundness_param() != t {
                return Err(SigmaError::SoundnessParameterMismatch(
                    t,
                    prover.soundness_param(),
                ));
            }
        }
        Ok(Self { provers, t, rng })
    }
}

impl<G: PrimeOrderGroup> ProverComputation<G> for ConjunctionProver<G> {
    fn compute_first_msg(
        &mut self,
        input: &ProverInput<G>,
    ) -> Result<SigmaMessage<G>, SigmaError> {
        let inputs = match input {
            ProverInput::Conjunction(inputs) => inputs,
            _ => return Err(SigmaError::UnexpectedInput("conjunction prover input")),
        };
        if inputs.len() != self.provers.len() {
            return Err(SigmaError::ExpectedSameSizeSequences(
                inputs.len(),
                self.provers.len(),
            ));
        }
        let mut messages = Vec::with_capacity(self.provers.len());
        for (prover, input) in self.provers.iter_mut().zip(inputs) {
            messages.push(prover.compute_first_msg(input)?);
        }
        Ok(SigmaMessage::Multiple(messages))
    }

    fn compute_second_msg(&mut self, challenge: &[u8]) -> Result<SigmaMessage<G>, SigmaError> {
        check_challenge_length(challenge, self.t)?;
        let mut messages = Vec::with_capacity(self.provers.len());
        // every conjunct answers the same challenge
        for prover in &mut self.provers {
            messages.push(prover.compute_second_msg(challenge)?);
        }
        Ok(SigmaMessage::Multiple(messages))
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }

    fn simulator(&mut self) -> Box<dyn Simulator<G> + Send> {
        let simulators = self
            .provers
            .iter_mut()
            .map(|prover| prover.simulator())
            .collect();
        Box::new(ConjunctionSimulator {
            simulators,
            t: self.t,
            rng: derive_rng(&mut self.rng),
        })
    }
}

/// Samples one challenge, shares it with every sub-verifier and accepts iff
/// all of them accept.
pub struct ConjunctionVerifier<G: PrimeOrderGroup> {
    verifiers: Vec<Box<dyn VerifierComputation<G> + Send>>,
    t: u32,
    rng: StdRng,
    challenge: Option<Vec<u8>>,
}

impl<G: PrimeOrderGroup> ConjunctionVerifier<G> {
    /// Every sub-verifier must report soundness parameter `t`.
    pub fn new(
        verifiers: Vec<Box<dyn VerifierComputation<G> + Send>>,
        t: u32,
        rng: StdRng,
    ) -> Result<Self, SigmaError> {
        for verifier in &verifiers {
            if verifier.soundness_param() != t {
                return Err(SigmaError::SoundnessParameterMismatch(
                    t,
                    verifier.soundness_param(),
                ));
            }
        }
        Ok(Self {
            verifiers,
            t,
            rng,
            challenge: None,
        })
    }

    fn install_challenge(&mut self, challenge: Vec<u8>) -> Result<(), SigmaError> {
        for verifier in &mut self.verifiers {
            verifier.set_challenge(&challenge)?;
        }
        self.challenge = Some(challenge);
        Ok(())
    }
}

impl<G: PrimeOrderGroup> VerifierComputation<G> for ConjunctionVerifier<G> {
    fn sample_challenge(&mut self) -> Result<(), SigmaError> {
        let challenge = sample_challenge(&mut self.rng, self.t);
        self.install_challenge(challenge)
    }

    fn set_challenge(&mut self, challenge: &[u8]) -> Result<(), SigmaError> {
        check_challenge_length(challenge, self.t)?;
        self.install_challenge(challenge.to_vec())
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
        let inputs = match input {
            CommonInput::Conjunction(inputs) => inputs,
            _ => return Err(SigmaError::UnexpectedInput("conjunction common input")),
        };
        // both prover messages must be message sequences
        let first = match a {
            SigmaMessage::Multiple(messages) => messages,
            _ => return Err(SigmaError::UnexpectedMessage("a sequence of first messages")),
        };
        let second = match z {
            SigmaMessage::Multiple(messages) => messages,
            _ => return Err(SigmaError::UnexpectedMessage("a sequence of responses")),
        };
        if inputs.len() != self.verifiers.len() {
            return Err(SigmaError::ExpectedSameSizeSequences(
                inputs.len(),
                self.verifiers.len(),
            ));
        }
        if first.len() != self.verifiers.len() {
            return Err(SigmaError::ExpectedSameSizeSequences(
                first.len(),
                self.verifiers.len(),
            ));
        }
        if second.len() != self.verifiers.len() {
            return Err(SigmaError::ExpectedSameSizeSequences(
                second.len(),
                self.verifiers.len(),
            ));
        }
        // consult every sub-verifier, no short-circuit
        let mut accepted = true;
        for (i, verifier) in self.verifiers.iter().enumerate() {
            accepted &= verifier.verify(&inputs[i], &first[i], &second[i])?;
        }
        Ok(accepted)
    }

    fn soundness_param(&self) -> u32 {
        self.t
    }
}

/// Feeds the shared challenge to every sub-simulator and zips the outputs.
pub struct ConjunctionSimulator<G: PrimeOrderGroup> {
    simulators: Vec<Box<dyn Simulator<G> + Send>>,
    t: u32,
    rng: StdRng,
}

impl<G: PrimeOrderGroup> ConjunctionSimulator<G> {
    /// Every sub-simulator must report soundness parameter `t`.
    pub fn new(
        simulators: Vec<Box<dyn Simulator<G> + Send>>,
        t: u32,
        rng: StdRng,
    ) -> Result<Self, SigmaError> {
        for simulator in &simulators {
            if simulator.soundness_param() != t {
                return Err(SigmaError::SoundnessParameterMismatch(
                    t,
                    simulator.soundness_param(),
                ));
            }
        }
        Ok(Self { simulators, t, rng })
    }
}

impl<G: PrimeOrderGroup> Simulator<G> for ConjunctionSimulator<G> {
    fn simulate_with_challenge(
        &mut self,
        input: &CommonInput<G>,
        challenge: &[u8],
    ) -> Result<SimulatedTranscript<G>, SigmaError> {
        let inputs = match input {
            CommonInput::Conjunction(inputs) => inputs,
            _ => return Err(SigmaError::UnexpectedInput("conjunction common input")),
        };
        check_challenge_length(challenge, self.t)?;
        if inputs.len() != self.simulators.len() {
            return Err(SigmaError::ExpectedSameSizeSequences(
                inputs.len(),
                self.simulators.len(),
            ));
        }
        let mut first = Vec::with_capacity(self.simulators.len());
        let mut second = Vec::with_capacity(self.simulators.len());
        for (simulator, input) in self.simulators.iter_mut().zip(inputs) {
            let transcript = simulator.simulate_with_challenge(input, challenge)?;
            first.push(transcript.first_message);
            second.push(transcript.second_message);
        }
        Ok(SimulatedTranscript {
            first_message: SigmaMessage::Multiple(first),
            challenge: challenge.to_vec(),
            second_message: SigmaMessage::Multiple(second),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dh_tuple::{DhTupleProver, DhTupleSimulator, DhTupleVerifier};
    use crate::dlog::{DlogProver, DlogSimulator, DlogVerifier};
    use crate::input::{DhTupleProverInput, DlogProverInput};
    use crate::zp_group::{Fq23, Group47};
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    const T: u32 = 4;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn conjunction_input(group: &Group47) -> ProverInput<Group47> {
        let g = group.generator();
        let h_dlog = group.exp(&g, &Fq23::from(7u64));
        let h = group.exp(&g, &Fq23::from(5u64));
        let u = group.exp(&g, &Fq23::from(3u64));
        let v = group.exp(&h, &Fq23::from(3u64));
        ProverInput::Conjunction(vec![
            ProverInput::Dlog(DlogProverInput::new(h_dlog, Fq23::from(7u64))),
            ProverInput::DhTuple(DhTupleProverInput::new(h, u, v, Fq23::from(3u64))),
        ])
    }

    fn conjunction_prover(group: Group47, seeds: [u64; 3]) -> ConjunctionProver<Group47> {
        ConjunctionProver::new(
            vec![
                Box::new(DlogProver::new(group, T, rng(seeds[0])).unwrap()),
                Box::new(DhTupleProver::new(group, T, rng(seeds[1])).unwrap()),
            ],
            T,
            rng(seeds[2]),
        )
        .unwrap()
    }

    fn conjunction_verifier(group: Group47, seeds: [u64; 3]) -> ConjunctionVerifier<Group47> {
        ConjunctionVerifier::new(
            vec![
                Box::new(DlogVerifier::new(group, T, rng(seeds[0])).unwrap()),
                Box::new(DhTupleVerifier::new(group, T, rng(seeds[1])).unwrap()),
            ],
            T,
            rng(seeds[2]),
        )
        .unwrap()
    }

    #[test]
    fn completeness() {
        let group = Group47::new();
        let input = conjunction_input(&group);
        let mut prover = conjunction_prover(group, [1, 2, 3]);
        let mut verifier = conjunction_verifier(group, [4, 5, 6]);

        let a = prover.compute_first_msg(&input).unwrap();
        verifier.sample_challenge().unwrap();
        let e = verifier.challenge().unwrap().to_vec();
        let z = prover.compute_second_msg(&e).unwrap();
        assert!(verifier.verify(&input.common_input(), &a, &z).unwrap());
    }

    // The conjunction accepts exactly when each conjunct accepts standalone
    // under the same challenge.
    #[test]
    fn decomposes_into_sub_verdicts() {
        let group = Group47::new();
        let input = conjunction_input(&group);
        let mut prover = conjunction_prover(group, [11, 12, 13]);
        let mut verifier = conjunction_verifier(group, [14, 15, 16]);

        let a = prover.compute_first_msg(&input).unwrap();
        verifier.set_challenge(&[0x09]).unwrap();
        let z = prover.compute_second_msg(&[0x09]).unwrap();
        assert!(verifier.verify(&input.common_input(), &a, &z).unwrap());

        let (first, second) = match (&a, &z) {
            (SigmaMessage::Multiple(first), SigmaMessage::Multiple(second)) => (first, second),
            _ => panic!("conjunction messages must be sequences"),
        };
        let common = match input.common_input() {
            CommonInput::Conjunction(inputs) => inputs,
            _ => unreachable!(),
        };
        let mut dlog_verifier = DlogVerifier::new(group, T, rng(20)).unwrap();
        dlog_verifier.set_challenge(&[0x09]).unwrap();
        assert!(dlog_verifier
            .verify(&common[0], &first[0], &second[0])
            .unwrap());
        let mut dh_verifier = DhTupleVerifier::new(group, T, rng(21)).unwrap();
        dh_verifier.set_challenge(&[0x09]).unwrap();
        assert!(dh_verifier
            .verify(&common[1], &first[1], &second[1])
            .unwrap());
    }

    #[test]
    fn one_bad_conjunct_rejects() {
        let group = Group47::new();
        let input = conjunction_input(&group);
        let mut prover = conjunction_prover(group, [31, 32, 33]);
        let mut verifier = conjunction_verifier(group, [34, 35, 36]);

        let a = prover.compute_first_msg(&input).unwrap();
        verifier.sample_challenge().unwrap();
        let e = verifier.challenge().unwrap().to_vec();
        let z = prover.compute_second_msg(&e).unwrap();

        let tampered = match &z {
            SigmaMessage::Multiple(messages) => {
                let mut messages = messages.clone();
                messages[0] = match &messages[0] {
                    SigmaMessage::Scalar(s) => SigmaMessage::Scalar(*s + Fq23::from(1u64)),
                    _ => panic!("discrete log response must be a scalar"),
                };
                SigmaMessage::Multiple(messages)
            }
            _ => panic!("conjunction response must be a sequence"),
        };
        assert!(!verifier
            .verify(&input.common_input(), &a, &tampered)
            .unwrap());
    }

    #[test]
    fn simulator_outputs_accepting_transcripts() {
        let group = Group47::new();
        let input = conjunction_input(&group);
        let common = input.common_input();

        let mut simulator = ConjunctionSimulator::new(
            vec![
                Box::new(DlogSimulator::new(group, T, rng(41)).unwrap()),
                Box::new(DhTupleSimulator::new(group, T, rng(42)).unwrap()),
            ],
            T,
            rng(43),
        )
        .unwrap();

        let transcript = simulator.simulate_with_challenge(&common, &[0x0d]).unwrap();
        let mut verifier = conjunction_verifier(group, [44, 45, 46]);
        verifier.set_challenge(&transcript.challenge).unwrap();
        assert!(verifier
            .verify(&common, &transcript.first_message, &transcript.second_message)
            .unwrap());

        let transcript = simulator.simulate(&common).unwrap();
        let mut verifier = conjunction_verifier(group, [47, 48, 49]);
        verifier.set_challenge(&transcript.challenge).unwrap();
        assert!(verifier
            .verify(&common, &transcript.first_message, &transcript.second_message)
            .unwrap());
    }

    #[test]
    fn prover_hands_out_matching_simulator() {
        let group = Group47::new();
        let input = conjunction_input(&group);
        let common = input.common_input();
        let mut prover = conjunction_prover(group, [51, 52, 53]);
        let mut simulator = prover.simulator();
        let transcript = simulator.simulate_with_challenge(&common, &[0x02]).unwrap();
        let mut verifier = conjunction_verifier(group, [54, 55, 56]);
        verifier.set_challenge(&[0x02]).unwrap();
        assert!(verifier
            .verify(&common, &transcript.first_message, &transcript.second_message)
            .unwrap());
    }

    #[test]
    fn soundness_parameter_must_agree() {
        let group = Group47::new();
        let result = ConjunctionProver::new(
            vec![
                Box::new(DlogProver::new(group, 4, rng(0)).unwrap()),
                Box::new(DhTupleProver::new(group, 3, rng(1)).unwrap()),
            ],
            4,
            rng(2),
        );
        assert!(matches!(
            result,
            Err(SigmaError::SoundnessParameterMismatch(4, 3))
        ));

        let result = ConjunctionVerifier::<Group47>::new(
            vec![Box::new(DlogVerifier::new(group, 2, rng(3)).unwrap())],
            4,
            rng(4),
        );
        assert!(matches!(
            result,
            Err(SigmaError::SoundnessParameterMismatch(4, 2))
        ));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let group = Group47::new();
        let mut prover = conjunction_prover(group, [61, 62, 63]);
        let g = group.generator();
        let h = group.exp(&g, &Fq23::from(7u64));
        let short = ProverInput::Conjunction(vec![ProverInput::Dlog(DlogProverInput::new(
            h,
            Fq23::from(7u64),
        ))]);
        assert!(matches!(
            prover.compute_first_msg(&short),
            Err(SigmaError::ExpectedSameSizeSequences(1, 2))
        ));
    }

    #[test]
    fn non_sequence_messages_are_rejected() {
        let group = Group47::new();
        let input = conjunction_input(&group);
        let mut verifier = conjunction_verifier(group, [71, 72, 73]);
        verifier.sample_challenge().unwrap();
        let scalar = SigmaMessage::Scalar(Fq23::from(1u64));
        let sequence = SigmaMessage::Multiple(vec![]);
        assert!(matches!(
            verifier.verify(&input.common_input(), &scalar, &sequence),
            Err(SigmaError::UnexpectedMessage(_))
        ));
        assert!(matches!(
            verifier.verify(&input.common_input(), &sequence, &scalar),
            Err(SigmaError::UnexpectedMessage(_))
        ));
    }
}

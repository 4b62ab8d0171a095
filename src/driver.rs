//! Three-message protocol drivers. A driver owns one channel endpoint and one
//! computation, runs exactly one proof in the strict order `a`, `e`, `z`, and
//! refuses reuse and out-of-order rounds. Messages are exchanged in their
//! canonical compressed encoding, one frame each.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::marker::PhantomData;
use tracing::debug;

use crate::channel::Channel;
use crate::error::SigmaError;
use crate::group::PrimeOrderGroup;
use crate::input::{CommonInput, ProverInput};
use crate::message::SigmaMessage;
use crate::{ProverComputation, VerifierComputation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProverRound {
    Fresh,
    FirstSent,
    Done,
}

/// Prover side of an interactive run.
pub struct SigmaProver<G, P, C> {
    channel: C,
    computation: P,
    round: ProverRound,
    _group: PhantomData<G>,
}

impl<G, P, C> SigmaProver<G, P, C>
where
    G: PrimeOrderGroup,
    P: ProverComputation<G>,
    C: Channel,
{
    pub fn new(channel: C, computation: P) -> Self {
        Self {
            channel,
            computation,
            round: ProverRound::Fresh,
            _group: PhantomData,
        }
    }

    /// Runs the whole proof: first message, then challenge and response.
    pub fn prove(&mut self, input: &ProverInput<G>) -> Result<(), SigmaError> {
        self.process_first_msg(input)?;
        self.process_second_msg()
    }

    /// Computes the first message and sends it.
    pub fn process_first_msg(&mut self, input: &ProverInput<G>) -> Result<(), SigmaError> {
        if self.round != ProverRound::Fresh {
            return Err(SigmaError::FirstMessageAlreadySent);
        }
        let first = self.computation.compute_first_msg(input)?;
        self.send(&first)?;
        self.round = ProverRound::FirstSent;
        debug!("first message sent");
        Ok(())
    }

    /// Blocks for the verifier's challenge, then computes and sends the
    /// response.
    pub fn process_second_msg(&mut self) -> Result<(), SigmaError> {
        match self.round {
            ProverRound::Fresh => return Err(SigmaError::FirstMessageNotSent),
            ProverRound::Done => return Err(SigmaError::ResponseAlreadySent),
            ProverRound::FirstSent => {}
        }
        let challenge = self.channel.read_with_size()?;
        debug!(bytes = challenge.len(), "challenge received");
        let response = self.computation.compute_second_msg(&challenge)?;
        self.send(&response)?;
        self.round = ProverRound::Done;
        debug!("response sent");
        Ok(())
    }

    fn send(&mut self, message: &SigmaMessage<G>) -> Result<(), SigmaError> {
        let mut bytes = Vec::with_capacity(message.compressed_size());
        message.serialize_compressed(&mut bytes)?;
        self.channel.write_with_size(&bytes)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VerifierRound {
    Fresh,
    ChallengeSent,
    Done,
}

/// Verifier side of an interactive run.
pub struct SigmaVerifier<G: PrimeOrderGroup, V, C> {
    channel: C,
    computation: V,
    round: VerifierRound,
    first_message: Option<SigmaMessage<G>>,
}

impl<G, V, C> SigmaVerifier<G, V, C>
where
    G: PrimeOrderGroup,
    V: VerifierComputation<G>,
    C: Channel,
{
    pub fn new(channel: C, computation: V) -> Self {
        Self {
            channel,
            computation,
            round: VerifierRound::Fresh,
            first_message: None,
        }
    }

    /// Runs the whole verification: receive `a`, send `e`, receive `z`,
    /// verify.
    pub fn verify(&mut self, input: &CommonInput<G>) -> Result<bool, SigmaError> {
        self.send_challenge()?;
        self.process_verify(input)
    }

    /// Blocks for the prover's first message, then samples and sends the
    /// challenge.
    pub fn send_challenge(&mut self) -> Result<(), SigmaError> {
        if self.round != VerifierRound::Fresh {
            return Err(SigmaError::ChallengeAlreadySent);
        }
        let first = self.receive()?;
        debug!("first message received");
        self.computation.sample_challenge()?;
        let challenge = self
            .computation
            .challenge()
            .ok_or(SigmaError::ChallengeNotSet)?
            .to_vec();
        self.channel.write_with_size(&challenge)?;
        self.first_message = Some(first);
        self.round = VerifierRound::ChallengeSent;
        debug!(bytes = challenge.len(), "challenge sent");
        Ok(())
    }

    /// Blocks for the prover's response and returns the verdict.
    pub fn process_verify(&mut self, input: &CommonInput<G>) -> Result<bool, SigmaError> {
        match self.round {
            VerifierRound::Fresh => return Err(SigmaError::ChallengeNotSent),
            VerifierRound::Done => return Err(SigmaError::ProofAlreadyVerified),
            VerifierRound::ChallengeSent => {}
        }
        let response = self.receive()?;
        debug!("response received");
        let first = self
            .first_message
            .take()
            .ok_or(SigmaError::ChallengeNotSent)?;
        self.round = VerifierRound::Done;
        self.computation.verify(input, &first, &response)
    }

    /// The challenge held by the underlying computation.
    pub fn challenge(&self) -> Option<&[u8]> {
        self.computation.challenge()
    }

    fn receive(&mut self) -> Result<SigmaMessage<G>, SigmaError> {
        let bytes = self.channel.read_with_size()?;
        Ok(SigmaMessage::deserialize_compressed(&bytes[..])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryChannel;
    use crate::conjunction::{ConjunctionProver, ConjunctionVerifier};
    use crate::dh_tuple::{DhTupleProver, DhTupleVerifier};
    use crate::dlog::{DlogProver, DlogVerifier};
    use crate::group::EllipticGroup;
    use crate::input::{DhTupleProverInput, DlogProverInput};
    use crate::zp_group::{Fq23, Group47};
    use ark_bls12_381::G1Projective;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use std::thread;

    type Bls = EllipticGroup<G1Projective>;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn dlog_proof_over_memory_channel() {
        let group = Bls::new();
        let witness = group.random_scalar(&mut rng(0));
        let h = group.exp(&group.generator(), &witness);
        let input = ProverInput::Dlog(DlogProverInput::new(h, witness));
        let common = input.common_input();

        let (prover_end, verifier_end) = MemoryChannel::pair();
        let prover_handle = thread::spawn(move || {
            let computation = DlogProver::new(group, 128, rng(1)).unwrap();
            let mut prover = SigmaProver::new(prover_end, computation);
            prover.prove(&input)
        });

        let computation = DlogVerifier::new(group, 128, rng(2)).unwrap();
        let mut verifier = SigmaVerifier::new(verifier_end, computation);
        assert!(verifier.verify(&common).unwrap());
        prover_handle.join().unwrap().unwrap();
    }

    #[test]
    fn stepwise_proof_over_memory_channel() {
        let group = Group47::new();
        let h = group.exp(&group.generator(), &Fq23::from(7u64));
        let input = ProverInput::Dlog(DlogProverInput::new(h, Fq23::from(7u64)));
        let common = input.common_input();

        let (prover_end, verifier_end) = MemoryChannel::pair();
        let prover_handle = thread::spawn(move || {
            let computation = DlogProver::new(group, 4, rng(3)).unwrap();
            let mut prover = SigmaProver::new(prover_end, computation);
            prover.process_first_msg(&input)?;
            prover.process_second_msg()
        });

        let computation = DlogVerifier::new(group, 4, rng(4)).unwrap();
        let mut verifier = SigmaVerifier::new(verifier_end, computation);
        verifier.send_challenge().unwrap();
        assert_eq!(verifier.challenge().unwrap().len(), 1);
        assert!(verifier.process_verify(&common).unwrap());
        prover_handle.join().unwrap().unwrap();
    }

    #[test]
    fn conjunction_proof_over_memory_channel() {
        let group = Group47::new();
        let g = group.generator();
        let h_dlog = group.exp(&g, &Fq23::from(7u64));
        let h = group.exp(&g, &Fq23::from(5u64));
        let u = group.exp(&g, &Fq23::from(3u64));
        let v = group.exp(&h, &Fq23::from(3u64));
        let input = ProverInput::Conjunction(vec![
            ProverInput::Dlog(DlogProverInput::new(h_dlog, Fq23::from(7u64))),
            ProverInput::DhTuple(DhTupleProverInput::new(h, u, v, Fq23::from(3u64))),
        ]);
        let common = input.common_input();

        let (prover_end, verifier_end) = MemoryChannel::pair();
        let prover_handle = thread::spawn(move || {
            let computation = ConjunctionProver::new(
                vec![
                    Box::new(DlogProver::new(group, 4, rng(5)).unwrap()),
                    Box::new(DhTupleProver::new(group, 4, rng(6)).unwrap()),
                ],
                4,
                rng(7),
            )
            .unwrap();
            let mut prover = SigmaProver::new(prover_end, computation);
            prover.prove(&input)
        });

        let computation = ConjunctionVerifier::new(
            vec![
                Box::new(DlogVerifier::new(group, 4, rng(8)).unwrap()),
                Box::new(DhTupleVerifier::new(group, 4, rng(9)).unwrap()),
            ],
            4,
            rng(10),
        )
        .unwrap();
        let mut verifier = SigmaVerifier::new(verifier_end, computation);
        assert!(verifier.verify(&common).unwrap());
        prover_handle.join().unwrap().unwrap();
    }

    #[test]
    fn prover_round_order_is_enforced() {
        let group = Group47::new();
        let (prover_end, _keep_alive) = MemoryChannel::pair();
        let computation = DlogProver::new(group, 4, rng(11)).unwrap();
        let mut prover = SigmaProver::new(prover_end, computation);

        assert!(matches!(
            prover.process_second_msg(),
            Err(SigmaError::FirstMessageNotSent)
        ));

        let h = group.exp(&group.generator(), &Fq23::from(2u64));
        let input = ProverInput::Dlog(DlogProverInput::new(h, Fq23::from(2u64)));
        prover.process_first_msg(&input).unwrap();
        assert!(matches!(
            prover.process_first_msg(&input),
            Err(SigmaError::FirstMessageAlreadySent)
        ));
    }

    #[test]
    fn verifier_round_order_is_enforced() {
        let group = Group47::new();
        let h = group.exp(&group.generator(), &Fq23::from(2u64));
        let common = CommonInput::Dlog(crate::input::DlogCommonInput { h });

        let (_keep_alive, verifier_end) = MemoryChannel::pair();
        let computation = DlogVerifier::new(group, 4, rng(12)).unwrap();
        let mut verifier = SigmaVerifier::new(verifier_end, computation);
        assert!(matches!(
            verifier.process_verify(&common),
            Err(SigmaError::ChallengeNotSent)
        ));
    }

    #[test]
    fn driver_is_single_shot() {
        let group = Group47::new();
        let h = group.exp(&group.generator(), &Fq23::from(7u64));
        let input = ProverInput::Dlog(DlogProverInput::new(h, Fq23::from(7u64)));
        let common = input.common_input();

        let (prover_end, verifier_end) = MemoryChannel::pair();
        let prover_handle = thread::spawn(move || {
            let computation = DlogProver::new(group, 4, rng(13)).unwrap();
            let mut prover = SigmaProver::new(prover_end, computation);
            prover.prove(&input)?;
            let again = prover.prove(&input);
            assert!(matches!(again, Err(SigmaError::FirstMessageAlreadySent)));
            Ok::<(), SigmaError>(())
        });

        let computation = DlogVerifier::new(group, 4, rng(14)).unwrap();
        let mut verifier = SigmaVerifier::new(verifier_end, computation);
        assert!(verifier.verify(&common).unwrap());
        assert!(matches!(
            verifier.verify(&common),
            Err(SigmaError::ChallengeAlreadySent)
        ));
        prover_handle.join().unwrap().unwrap();
    }

    #[test]
    fn malformed_wire_bytes_surface_as_serialization_error() {
        let group = Group47::new();
        let h = group.exp(&group.generator(), &Fq23::from(7u64));
        let common = CommonInput::Dlog(crate::input::DlogCommonInput { h });

        let (mut attacker_end, verifier_end) = MemoryChannel::pair();
        attacker_end.write_with_size(&[0xff, 0x01, 0x02]).unwrap();

        let computation = DlogVerifier::new(group, 4, rng(15)).unwrap();
        let mut verifier = SigmaVerifier::new(verifier_end, computation);
        let result = verifier.verify(&common);
        assert!(matches!(result, Err(SigmaError::Serialization(_))));
    }
}

mod validators;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use config::{Map, Source, Value, ValueKind};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use slog::{Drain, Level, Logger, debug, info};

use attest_aggregator::gossip::{GossipPublisher, InMemoryGossipNetwork};
use attest_aggregator::services::{CollectionSession, ProofVerifier, StaticMemberDirectoryProvider};
use attest_aggregator::{Configuration, DefaultConfiguration};
use attest_bls::{BlsKeyPair, DirectoryEpoch, Member, MemberDirectory};
use attest_common::StdResult;
use attest_common::entities::ContentIdentifier;
use attest_common::messages::CollectionResponseMessage;

use crate::validators::{SimulatedValidator, ValidatorBehavior};

/// Simple demonstration of the data availability attestation protocol
#[derive(Parser, Debug, Clone)]
#[clap(name = "attestdemo")]
#[clap(version)]
pub struct Args {
    /// Run Mode, selects the configuration file
    #[clap(short, long, env = "RUN_MODE", default_value = "dev")]
    run_mode: String,

    /// Verbosity level, add more v to increase
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory where the configuration files are located
    #[clap(long, default_value = "./config")]
    config_directory: PathBuf,

    /// Enable JSON output for logs
    #[clap(long)]
    log_format_json: bool,

    /// Override the network identifier
    #[clap(long)]
    network: Option<String>,

    /// Override the quorum threshold
    #[clap(short, long)]
    quorum_threshold: Option<usize>,

    /// Override the error threshold
    #[clap(short, long)]
    error_threshold: Option<usize>,

    /// Override the collection timeout, in milliseconds
    #[clap(long)]
    collection_timeout_ms: Option<u64>,

    /// Number of validators in the member directory
    #[clap(long, default_value_t = 5)]
    validators: usize,

    /// Number of validators declining to sign
    #[clap(long, default_value_t = 1)]
    decliners: usize,

    /// Number of validators signing something else than the claim
    #[clap(long, default_value_t = 1)]
    byzantine: usize,

    /// Content to attest
    #[clap(long, default_value = "demo contract bytes")]
    content: String,

    /// Seed of the validators keys
    #[clap(long, default_value_t = 0)]
    seed: u8,
}

impl Args {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::Warning,
            1 => Level::Info,
            2 => Level::Debug,
            _ => Level::Trace,
        }
    }

    fn build_logger(&self) -> Logger {
        let drain = if self.log_format_json {
            let drain = slog_bunyan::with_name("attestdemo", std::io::stdout())
                .set_pretty(false)
                .build()
                .fuse();
            let drain = slog::LevelFilter::new(drain, self.log_level()).fuse();

            slog_async::Async::new(drain).build().fuse()
        } else {
            let decorator = slog_term::TermDecorator::new().build();
            let drain = slog_term::CompactFormat::new(decorator).build().fuse();
            let drain = slog::LevelFilter::new(drain, self.log_level()).fuse();

            slog_async::Async::new(drain).build().fuse()
        };

        Logger::root(Arc::new(drain), slog::o!())
    }

    fn build_configuration(&self) -> StdResult<Configuration> {
        let filename = format!("{}/{}.json", self.config_directory.display(), self.run_mode);

        config::Config::builder()
            .add_source(DefaultConfiguration::default())
            .set_default("quorum_threshold", 3)?
            .set_default("error_threshold", 2)?
            .set_default("collection_timeout_ms", 5_000)?
            .add_source(config::File::with_name(&filename).required(false))
            .add_source(config::Environment::with_prefix("ATTEST"))
            .add_source(self.clone())
            .build()
            .with_context(|| "configuration build error")?
            .try_deserialize()
            .with_context(|| "configuration deserialize error")
    }

    fn behaviors(&self) -> StdResult<Vec<ValidatorBehavior>> {
        if self.decliners + self.byzantine > self.validators {
            return Err(anyhow!(
                "{} decliners and {} byzantine validators do not fit in {} validators",
                self.decliners,
                self.byzantine,
                self.validators
            ));
        }
        let honest = self.validators - self.decliners - self.byzantine;

        Ok(std::iter::repeat_n(ValidatorBehavior::Decline, self.decliners)
            .chain(std::iter::repeat_n(ValidatorBehavior::Byzantine, self.byzantine))
            .chain(std::iter::repeat_n(ValidatorBehavior::Honest, honest))
            .collect())
    }
}

impl Source for Args {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let mut result = Map::new();
        let namespace = "clap arguments".to_string();

        if let Some(network) = self.network.clone() {
            result.insert(
                "network".to_string(),
                Value::new(Some(&namespace), ValueKind::from(network)),
            );
        }
        if let Some(quorum_threshold) = self.quorum_threshold {
            result.insert(
                "quorum_threshold".to_string(),
                Value::new(Some(&namespace), ValueKind::from(quorum_threshold as u64)),
            );
        }
        if let Some(error_threshold) = self.error_threshold {
            result.insert(
                "error_threshold".to_string(),
                Value::new(Some(&namespace), ValueKind::from(error_threshold as u64)),
            );
        }
        if let Some(collection_timeout_ms) = self.collection_timeout_ms {
            result.insert(
                "collection_timeout_ms".to_string(),
                Value::new(Some(&namespace), ValueKind::from(collection_timeout_ms)),
            );
        }

        Ok(result)
    }
}

fn generate_directory(seed: u8, validators: usize) -> StdResult<(MemberDirectory, Vec<BlsKeyPair>)> {
    let mut rng = ChaCha20Rng::from_seed([seed; 32]);
    let key_pairs: Vec<BlsKeyPair> = (0..validators)
        .map(|_| BlsKeyPair::generate(&mut rng))
        .collect();
    let members = key_pairs
        .iter()
        .enumerate()
        .map(|(index, key_pair)| {
            Member::from(key_pair.identity()).with_account(format!("validator-{index}"))
        })
        .collect();
    let directory = MemberDirectory::new(DirectoryEpoch(1), members)?;

    Ok((directory, key_pairs))
}

async fn run(args: Args, logger: Logger) -> StdResult<()> {
    let config = args.build_configuration()?;
    debug!(logger, "Started"; "run_mode" => &args.run_mode, "config" => ?config);
    let topics = config.gossip_topics();

    println!(">> Establish phase: {} validators", args.validators);
    let (directory, key_pairs) = generate_directory(args.seed, args.validators)?;
    for member in directory.members() {
        println!(
            "   {} {}",
            member.account().unwrap_or_default(),
            member.identity()
        );
    }
    let directory = Arc::new(directory);
    let network = Arc::new(InMemoryGossipNetwork::new(logger.clone()));

    let mut handles = vec![];
    for (key_pair, behavior) in key_pairs.into_iter().zip(args.behaviors()?) {
        let validator =
            SimulatedValidator::new(behavior, key_pair, topics.clone(), network.clone(), &logger)?;
        handles.push(validator.spawn().await?);
    }

    println!("\n>> Collection phase");
    let content = args.content.clone().into_bytes();
    let cid = ContentIdentifier::for_binary(&content)?;
    println!("   content cid: {cid}");
    let mut session = CollectionSession::new(
        cid,
        directory.clone(),
        config.collection_parameters(),
        topics.clone(),
        network.clone(),
        network.clone(),
        logger.clone(),
    )?
    .with_payload(content);
    let result = session.run().await;
    println!("   report: {:?}", session.report());
    let proof = result?;

    let message = CollectionResponseMessage::from(&proof);
    println!("\n>> Proof:\n{}", serde_json::to_string_pretty(&message)?);
    println!(
        "   signers bitmask: {}",
        proof.signature.bitmask.to_bit_string(directory.len())
    );
    network
        .publish(&topics.response(), message.to_bytes()?)
        .await?;

    println!("\n>> Verification phase");
    let verifier = ProofVerifier::new(
        Arc::new(StaticMemberDirectoryProvider::new(directory.as_ref().clone())),
        config.quorum_threshold,
        logger.clone(),
    );
    let (_, signers) = verifier.verify_message(&message.to_bytes()?).await?;
    for signer in &signers {
        println!("   signed by {signer}");
    }

    for handle in handles {
        if let Ok(Err(error)) = handle.await {
            debug!(logger, "Validator ended with an error"; "error" => ?error);
        }
    }
    info!(logger, "Demonstration completed"; "signers" => signers.len());

    Ok(())
}

#[tokio::main]
async fn main() -> StdResult<()> {
    let args = Args::parse();
    let logger = args.build_logger();

    println!(">> Launch attestation protocol demonstrator");
    let result = run(args, logger).await;
    match &result {
        Ok(()) => println!("\n>> Congrats, protocol terminated with success!\n"),
        Err(error) => println!("\n>> Protocol failed: {error:?}\n"),
    }

    result
}

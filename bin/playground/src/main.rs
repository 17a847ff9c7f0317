// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::{error::Error, time::Instant};

use clap::{Parser, ValueEnum};
use crossbeam_channel::{Sender, bounded};
use spindle_runtime::{Actor, ActorRef, ActorSystem, Context, Flow, SpawnOptions, Strategy};
use spindle_sub_tracing::{Format, TracingBuilder};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
	Pretty,
	Compact,
	Json,
}

impl From<LogFormat> for Format {
	fn from(format: LogFormat) -> Self {
		match format {
			LogFormat::Pretty => Format::Pretty,
			LogFormat::Compact => Format::Compact,
			LogFormat::Json => Format::Json,
		}
	}
}

#[derive(Parser, Debug)]
#[command(name = "spindle-playground")]
#[command(about = "Bounces a message between two actors under every strategy composition")]
struct Args {
	/// Worker threads for cooperative actors, defaults to the CPU count
	#[arg(short, long)]
	workers: Option<usize>,

	/// Hits per rally
	#[arg(short, long, default_value_t = 10_000)]
	rounds: u32,

	/// Log filter directive
	#[arg(long, default_value = "info")]
	log: String,

	#[arg(long, value_enum, default_value_t = LogFormat::Compact)]
	format: LogFormat,
}

struct Ball {
	hits: u32,
	from: ActorRef<Ball>,
}

struct Player {
	rounds: u32,
	finished: Sender<u32>,
}

impl Actor for Player {
	type State = ();
	type Message = Ball;

	fn init(&self, _ctx: &mut Context<'_, Ball>) -> Self::State {}

	fn handle(&self, _state: &mut (), ball: Ball, ctx: &mut Context<'_, Ball>) -> Flow {
		if ball.hits >= self.rounds {
			let _ = self.finished.send(ball.hits);
			return Flow::Stop;
		}
		let Some(me) = ctx.self_ref() else {
			return Flow::Stop;
		};
		match ball.from.send(Ball {
			hits: ball.hits + 1,
			from: me,
		}) {
			Ok(()) => Flow::Continue,
			Err(err) => {
				warn!(%err, "partner left the rally");
				Flow::Stop
			}
		}
	}
}

const COMPOSITIONS: [SpawnOptions; 8] = [
	SpawnOptions::empty(),
	SpawnOptions::PRIORITY_AWARE,
	SpawnOptions::BLOCKING_API,
	SpawnOptions::BLOCKING_API.union(SpawnOptions::PRIORITY_AWARE),
	SpawnOptions::DETACHED,
	SpawnOptions::DETACHED.union(SpawnOptions::PRIORITY_AWARE),
	SpawnOptions::DETACHED.union(SpawnOptions::BLOCKING_API),
	SpawnOptions::DETACHED.union(SpawnOptions::BLOCKING_API).union(SpawnOptions::PRIORITY_AWARE),
];

fn rally(system: &ActorSystem, options: SpawnOptions, rounds: u32) -> Result<(), Box<dyn Error>> {
	let strategy = Strategy::select(options)?;
	let (finished, done) = bounded(1);
	let player = |name: &str| {
		system.spawn(
			name,
			Player {
				rounds,
				finished: finished.clone(),
			},
			options,
		)
	};
	let ping = player("ping")?;
	let pong = player("pong")?;

	let started = Instant::now();
	ping.send(Ball {
		hits: 0,
		from: pong.clone(),
	})
	.map_err(|err| err.to_string())?;
	let hits = done.recv()?;
	let elapsed = started.elapsed();

	ping.stop();
	pong.stop();

	let per_hit = elapsed / hits.max(1);
	info!(
		scheduling = ?strategy.scheduling,
		resume = ?strategy.resume,
		priority = ?strategy.priority,
		invoke = ?strategy.invoke,
		hits,
		?elapsed,
		?per_hit,
		"rally finished"
	);
	Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
	let args = Args::parse();

	TracingBuilder::new().with_filter(args.log.as_str()).with_format(args.format.into()).try_init()?;

	let mut builder = ActorSystem::builder().thread_name("playground");
	if let Some(workers) = args.workers {
		builder = builder.workers(workers);
	}
	let system = builder.build()?;
	info!(workers = system.config().workers, rounds = args.rounds, "actor system started");

	for options in COMPOSITIONS {
		rally(&system, options, args.rounds)?;
	}

	system.shutdown()?;
	Ok(())
}

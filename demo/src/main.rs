use std::process::ExitCode;
use std::thread;

use dotenv::dotenv;
use ring_logger::{info, warning, ShutdownSignal};
use ring_logger_proc_macro::log;

mod config;

#[log(dbgrm)]
fn checksum(producer: usize, sequence: usize) -> usize {
    producer.wrapping_mul(31).wrapping_add(sequence)
}

fn produce(producer: usize, messages: usize) {
    for sequence in 0..messages {
        let sum = checksum(producer, sequence);
        info!("producer", "producer %d wrote message %d (checksum %x)", producer, sequence, sum);
    }
    warning!("producer", "producer %d done after %d messages", producer, messages);
}

fn main() -> ExitCode {
    dotenv().ok();

    let cfg = config::Config::default();
    let signal = ShutdownSignal::new();
    if !ring_logger::init(cfg.logger, &signal) {
        return ExitCode::FAILURE;
    }

    info!("demo", "starting %d producers", cfg.producers);
    let workers: Vec<_> = (0..cfg.producers)
        .map(|producer| {
            let messages = cfg.messages_per_producer;
            thread::spawn(move || produce(producer, messages))
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            ring_logger::error!("demo", "a producer thread panicked");
        }
    }
    info!("demo", "all producers finished");

    signal.trigger();
    if let Some(completion) = ring_logger::completion() {
        completion.wait();
    }
    ExitCode::SUCCESS
}

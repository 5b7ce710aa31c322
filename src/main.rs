// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::{json, Value};
use the_conveyor::config::{load_and_validate_config, EngineConfig};
use the_conveyor::engine::{DataProcessor, ProcessingEvent, ProcessingOptions};
use the_conveyor::errors::ListenerError;
use the_conveyor::observability::init_tracing;
use the_conveyor::pipeline::StreamProcessor;

const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("Usage: {} [config.yaml|config.toml]", args[0]);
        eprintln!("Example: {} configs/conveyor.yaml", args[0]);
        return Ok(());
    }

    let config = match args.get(1) {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("failed to load config '{}'", path))?,
        None => EngineConfig::default(),
    };
    init_tracing(&config.logging);

    println!("🚚 Conveyor Processing Demo");
    println!("═══════════════════════════");

    let processor = DataProcessor::from_config(&config);
    processor.register_listener(Arc::new(|event: &ProcessingEvent| -> Result<(), ListenerError> {
        match event {
            ProcessingEvent::Start { total_items } => println!("  ▶ start ({} items)", total_items),
            ProcessingEvent::Progress { current, total, item } => {
                println!("  • {}/{} id={} data={}", current, total, item.id, item.data)
            }
            ProcessingEvent::Complete => println!("  ✔ complete"),
            ProcessingEvent::Error { cause, code } => println!("  ✖ {} ({})", cause, code),
        }
        Ok(())
    }));

    run_stream_demo(&processor).await?;
    run_batch_demo(&processor).await?;
    run_pipeline_demos(&StreamProcessor::from_settings(&config.pipeline)).await?;

    // Coordinated shutdown: never exit while an iterative run still holds the flag.
    while processor.is_processing() {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }

    println!("\n🎉 Demo complete!");
    Ok(())
}

async fn run_stream_demo(processor: &DataProcessor) -> Result<()> {
    println!("\n📜 Iterative stream");
    let items = vec![json!({"id": 1}), json!("hello"), json!("world")];
    let mut results = processor.process_stream(items, ProcessingOptions::default());
    while let Some(result) = results.next().await {
        result?;
    }

    println!("\n🔥 Offloaded stream");
    let start = Instant::now();
    let mut results =
        processor.process_stream(vec![json!({"id": "cpu-1"})], ProcessingOptions::cpu_intensive());
    while let Some(result) = results.next().await {
        let result = result?;
        if let Some(details) = result.offload {
            println!(
                "  fibonacci={} worker={} worker_time={:.2}ms total={:?}",
                details.fibonacci_result,
                details.worker_id,
                details.processing_time,
                start.elapsed()
            );
        }
    }
    Ok(())
}

async fn run_batch_demo(processor: &DataProcessor) -> Result<()> {
    println!("\n📦 Batch");
    let items: Vec<Value> = (1..=10).map(|n| json!(format!("item-{}", n))).collect();
    let results = processor.process_batch_default(items).await?;
    let data: Vec<String> = results.iter().map(|r| r.data.to_string()).collect();
    println!("  {} results: {}", results.len(), data.join(", "));
    Ok(())
}

async fn run_pipeline_demos(streams: &StreamProcessor) -> Result<()> {
    println!("\n🔁 In-memory pipeline");
    let upper = streams
        .process_in_memory_stream(vec!["hello", "world"], |s: &str| Ok(s.to_uppercase()))
        .await?;
    println!("  {:?}", upper);

    println!("\n🔌 Stream interop");
    let words = streams.demonstrate_stream_interop().await?;
    println!("  {:?}", words);

    println!("\n🚰 Backpressure");
    let items: Vec<Value> = (0..500).map(|n| json!({"n": n})).collect();
    let report = streams.handle_backpressure(items).await?;
    println!(
        "  {} items in {} chunks, max {} chunk(s) in flight",
        report.items.len(),
        report.chunks,
        report.max_chunks_in_flight
    );
    Ok(())
}

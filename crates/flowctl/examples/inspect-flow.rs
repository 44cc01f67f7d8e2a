//! Configure a flow on the in-memory primitive and print its parameters.
//!
//! Run with:
//!   cargo run -p flowctl --example inspect-flow

use std::time::Duration;

use flowctl::primitive::{MemoryConfig, MemoryPrimitive};
use flowctl::{FlowControl, FlowFlags, QosSpec};
use tracing::level_filters::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(LevelFilter::TRACE)
        .with_ansi(false)
        .with_target(false)
        .try_init();

    let ctl = FlowControl::new(MemoryPrimitive::new(MemoryConfig {
        first_descriptor: 3,
        ..MemoryConfig::default()
    }));
    let fd = ctl
        .primitive()
        .open_with_qos(QosSpec::default().with_delay(100).with_in_order(true))?;
    ctl.primitive().set_queue_lengths(fd, 2, 0);

    let flow = ctl.flow(fd);
    flow.set_send_timeout(Duration::from_secs(1))?;
    flow.set_recv_timeout(Duration::from_millis(2500))?;
    flow.insert_flags(FlowFlags::NON_BLOCKING_READ)?;

    println!("flow:         {fd}");
    println!("send timeout: {:?}", flow.send_timeout()?);
    println!("recv timeout: {:?}", flow.recv_timeout()?);
    println!("qos:          {:?}", flow.qos()?);
    println!("rx queued:    {}", flow.rx_queue_len()?);
    println!("tx queued:    {}", flow.tx_queue_len()?);
    println!("flags:        {:?}", flow.flags()?);

    ctl.primitive().close(fd);
    match flow.flags() {
        Ok(flags) => println!("closed flow still answers: {flags:?}"),
        Err(err) => eprintln!("after close: {err}"),
    }

    Ok(())
}

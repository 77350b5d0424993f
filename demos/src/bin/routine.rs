//! Three periodic tasks sharing one loop, on a hosted target
//!
//! Prints a line in a different column for each task - every 250 ms,
//! 1000 ms and 2000 ms respectively - for ten seconds, without a single
//! blocking delay.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::{Duration, Instant};

use rota::{Clock, Scheduler};

/// How long the routine runs for
const RUN_FOR_MS: u32 = 10_000;

/// Milliseconds since program start
struct HostClock {
    start: Instant,
}

impl Clock for HostClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

fn main() {
    let clock = HostClock {
        start: Instant::now(),
    };
    println!("Process Routine:");
    println!("hello");
    println!("\t world");
    println!("\t\t  print");
    println!("____|____|____");

    let mut hello = || {
        println!("{:.2}", seconds(&clock));
        Ok(())
    };
    let mut world = || {
        println!("\t {:.2}", seconds(&clock));
        Ok(())
    };
    let mut print = || {
        println!("\t\t  {:.2}", seconds(&clock));
        Ok(())
    };

    let mut scheduler: Scheduler<_, 8> = Scheduler::new(&clock);
    scheduler.register(250, &mut hello).unwrap();
    scheduler.register(1000, &mut world).unwrap();
    scheduler.register(2000, &mut print).unwrap();

    while clock.now_ms() < RUN_FOR_MS {
        scheduler.tick();
        // poll once a millisecond - the scheduler itself never waits
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Seconds since program start, for the printouts
fn seconds(clock: &HostClock) -> f32 {
    clock.now_ms() as f32 / 1000.0
}

// End of File

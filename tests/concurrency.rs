//! Concurrency properties: exactly one provisioning winner per address,
//! deterministic supersede of scheduled tasks, clean shutdown.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pinhub::prelude::*;
use pinhub_sim::{sim_profile, SimProvider};

fn controller() -> (Arc<SimProvider>, GpioController) {
    let provider = Arc::new(SimProvider::new());
    let gpio = GpioController::new(sim_profile(), Arc::clone(&provider) as _);
    (provider, gpio)
}

#[test]
fn concurrent_provisioning_has_one_winner() {
    let (_, gpio) = controller();
    let gpio = Arc::new(gpio);

    let results: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gpio = Arc::clone(&gpio);
                scope.spawn(move || {
                    gpio.provision_digital_output(1, &format!("claimant-{}", i))
                        .is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1);
    assert_eq!(gpio.provisioned_pins().len(), 1);
}

#[test]
fn losers_observe_already_provisioned() {
    let (_, gpio) = controller();

    let _winner = gpio.provision_digital_output(1, "winner").unwrap();
    for _ in 0..4 {
        assert!(matches!(
            gpio.provision_digital_output(1, "loser"),
            Err(GpioError::PinAlreadyProvisioned { address: 1, .. })
        ));
    }
}

#[test]
fn provisioning_different_pins_is_independent() {
    let (_, gpio) = controller();
    let gpio = Arc::new(gpio);

    let ok = thread::scope(|scope| {
        let handles: Vec<_> = (0..3u8)
            .map(|address| {
                let gpio = Arc::clone(&gpio);
                scope.spawn(move || {
                    gpio.provision_digital_output(address, &format!("pin-{}", address))
                        .is_ok()
                })
            })
            .collect();
        handles.into_iter().all(|h| h.join().unwrap())
    });

    assert!(ok);
    assert_eq!(gpio.provisioned_pins().len(), 3);
}

#[test]
fn new_pulse_supersedes_running_blink() {
    let (_, gpio) = controller();
    let pin = gpio.provision_digital_output(0, "led").unwrap();

    pin.low().unwrap();
    pin.blink(
        Duration::from_millis(50),
        Duration::from_secs(10),
        PinState::High,
    )
    .unwrap();

    // Let the blink establish itself, then replace it with a short pulse
    thread::sleep(Duration::from_millis(120));
    pin.pulse_blocking(Duration::from_millis(100), PinState::High)
        .unwrap();
    assert!(pin.is_low().unwrap());

    // The superseded blink must produce no further flips
    for _ in 0..6 {
        thread::sleep(Duration::from_millis(60));
        assert!(pin.is_low().unwrap());
    }
}

#[test]
fn cancel_scheduled_stops_flipping() {
    let (_, gpio) = controller();
    let pin = gpio.provision_digital_output(0, "led").unwrap();

    pin.low().unwrap();
    pin.blink(
        Duration::from_millis(40),
        Duration::from_secs(10),
        PinState::High,
    )
    .unwrap();

    thread::sleep(Duration::from_millis(100));
    pin.cancel_scheduled();

    let frozen = pin.state().unwrap();
    for _ in 0..5 {
        thread::sleep(Duration::from_millis(50));
        assert_eq!(pin.state().unwrap(), frozen);
    }
}

#[test]
fn unprovision_cancels_scheduled_task() {
    let (provider, gpio) = controller();
    let pin = gpio.provision_digital_output(0, "led").unwrap();

    pin.blink(
        Duration::from_millis(40),
        Duration::from_secs(10),
        PinState::High,
    )
    .unwrap();

    thread::sleep(Duration::from_millis(100));
    gpio.unprovision_pin(&pin.as_pin().clone()).unwrap();

    assert!(!provider.is_exported(0));
    let frozen = provider.line_state(0).unwrap();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(provider.line_state(0).unwrap(), frozen);
}

#[test]
fn shutdown_cancels_tasks_and_unexports_all() {
    let (provider, gpio) = controller();

    let led = gpio.provision_digital_output(0, "led").unwrap();
    let _input = gpio.provision_digital_input(3, "button").unwrap();
    led.blink(
        Duration::from_millis(40),
        Duration::from_secs(10),
        PinState::High,
    )
    .unwrap();

    gpio.shutdown();

    assert!(gpio.provisioned_pins().is_empty());
    assert!(!provider.is_exported(0));
    assert!(!provider.is_exported(3));
    assert!(!led.is_exported());

    // Worker threads are joined during shutdown; the line stays frozen
    let frozen = provider.line_state(0).unwrap();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(provider.line_state(0).unwrap(), frozen);
}

#[test]
fn dropping_controller_releases_pins() {
    let provider = Arc::new(SimProvider::new());
    {
        let gpio = GpioController::new(sim_profile(), Arc::clone(&provider) as _);
        let led = gpio.provision_digital_output(0, "led").unwrap();
        led.pulse(Duration::from_secs(10), PinState::High).unwrap();
    }
    assert!(!provider.is_exported(0));
}

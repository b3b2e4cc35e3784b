// Walks the simulated clock through a short session and prints what the
// serial port would show

use clock_core::test_utils::Rig;
use clock_core::DisplayMode;

fn main() {
    println!("🧪 Clock Simulation");

    let mut rig = Rig::new();
    print!("{}", rig.boot());

    // Session 1: serial commands
    session_commands(&mut rig);

    // Session 2: front-panel switches
    session_switches(&mut rig);

    // Session 3: alarm and melody
    session_alarm(&mut rig);

    println!("✅ Simulation finished");
    println!();
    println!("📝 Run the checks with: cargo test");
}

fn show(rig: &mut Rig, line: &str) {
    println!("> {}", line);
    print!("{}", rig.command(line));
}

fn session_commands(rig: &mut Rig) {
    println!("⌨️ Serial commands...");
    for line in [
        "GET TIME",
        "GET DATE",
        "SET TIME 23:59:58",
        "SET DATE 2024.02.28",
        "FOO",
    ] {
        show(rig, line);
    }
    rig.run_ms(2000);
    show(rig, "GET TIME");
    show(rig, "GET DATE");
    show(rig, "GET RUNTIME");
}

fn session_switches(rig: &mut Rig) {
    println!("🔘 Switches...");
    for (index, expected) in [
        (2, DisplayMode::Time),
        (3, DisplayMode::Date),
        (1, DisplayMode::Runtime),
    ] {
        rig.press_switch(index);
        let mode = rig.state(|s| s.mode);
        assert_eq!(mode, expected);
        println!("  SW{} -> {:?}", index, mode);
    }
}

fn session_alarm(rig: &mut Rig) {
    println!("⏰ Alarm...");
    show(rig, "SET TIME 08:59:59");
    show(rig, "SET ALARM 09:00:00");
    rig.run_ms(1500);
    println!(
        "  melody playing: {}",
        rig.state(|s| s.melody.is_playing())
    );
    rig.press_key(0, 5);
    print!("{}", rig.hal.take_output());
    rig.run_ms(100);
    println!(
        "  melody playing: {}",
        rig.state(|s| s.melody.is_playing())
    );
}

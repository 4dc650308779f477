//! Statistics display and formatting

use sr_sim::{DirectionStats, SimTime, SimulationReport};

/// Format a ratio as a percentage, "N/A" when the denominator is zero
pub fn format_percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        "N/A".to_string()
    } else {
        format!("{:.2}%", part as f64 * 100.0 / whole as f64)
    }
}

/// Format simulated time in emulator units
pub fn format_sim_time(time: SimTime) -> String {
    format!("{:.3} units", time.as_units())
}

fn display_direction(label: &str, stats: &DirectionStats) {
    println!(
        "│ {:<9} │ {:>8} │ {:>8} │ {:>9} │",
        label, stats.frames, stats.lost, stats.corrupted
    );
}

/// Display the end-of-run report
pub fn display_report(report: &SimulationReport) {
    let sender = &report.sender;
    let receiver = &report.receiver;

    println!("\n┌─────────────────────────────────────────────────────────────┐");
    println!("│ SIMULATION SUMMARY                                          │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Finished at:        {}", format_sim_time(report.finished_at));
    println!("│ Completed:          {}", report.completed);
    println!("│ Delivered in order: {}", report.delivered_in_order());
    println!(
        "│ Messages:           {} generated / {} admitted / {} rejected",
        report.generated,
        report.admitted.len(),
        report.rejected
    );
    println!("│ Delivered:          {}", report.delivered.len());
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ SENDER (A)                                                  │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Packets sent:       {}", sender.packets_sent);
    println!(
        "│ Packets resent:     {} ({})",
        sender.packets_resent,
        format_percent(sender.packets_resent, sender.packets_sent)
    );
    println!("│ Timeouts:           {}", sender.timeouts);
    println!(
        "│ ACKs:               {} received / {} new / {} duplicate / {} stale / {} corrupted",
        sender.acks_received,
        sender.new_acks,
        sender.duplicate_acks,
        sender.stale_acks,
        sender.corrupted_acks
    );
    println!("│ Window full:        {}", sender.window_full);
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ RECEIVER (B)                                                │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Packets received:   {}", receiver.packets_received);
    println!("│ Packets delivered:  {}", receiver.packets_delivered);
    println!("│ Duplicates:         {}", receiver.duplicates);
    println!("│ Out of window:      {}", receiver.out_of_window);
    println!("│ Corrupted:          {}", receiver.corrupted);
    println!("│ ACKs sent:          {}", receiver.acks_sent);
    println!("└─────────────────────────────────────────────────────────────┘");

    println!("\n┌───────────┬──────────┬──────────┬───────────┐");
    println!("│ Link      │ Frames   │ Lost     │ Corrupted │");
    println!("├───────────┼──────────┼──────────┼───────────┤");
    display_direction("A -> B", &report.link.to_receiver);
    display_direction("B -> A", &report.link.to_sender);
    println!("└───────────┴──────────┴──────────┴───────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1, 4), "25.00%");
        assert_eq!(format_percent(0, 10), "0.00%");
        assert_eq!(format_percent(3, 0), "N/A");
    }

    #[test]
    fn test_format_sim_time() {
        let time = SimTime::from_duration(Duration::from_micros(12_500));
        assert_eq!(format_sim_time(time), "12.500 units");
    }
}

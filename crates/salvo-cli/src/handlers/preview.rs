//! Preview command handler: show the plan without synthesizing anything.

use anyhow::Result;
use salvo_core::CountdownRequest;
use salvo_voice::intro_phrase;

use crate::bootstrap::CliContext;
use crate::commands::PlanArgs;
use crate::handlers::roster::plan_from;

pub fn execute(ctx: &CliContext, args: &PlanArgs) -> Result<()> {
    let request = plan_from(args)?;
    let fingerprint = ctx.engine.fingerprint(&request);
    let cached = ctx.engine.artifact_path(&fingerprint).is_file();

    print!("{}", format_plan(&request));
    println!();
    println!("Fingerprint: {fingerprint}{}", if cached { " (cached)" } else { "" });
    println!("Intro: {}", intro_phrase(&request));
    Ok(())
}

/// Plan table, one participant per line.
pub fn format_plan(request: &CountdownRequest) -> String {
    let mut out = match request.group_filter {
        Some(group) => format!("Attack plan for group {group} ({}s total)\n", request.total_duration),
        None => format!("Attack plan ({}s total)\n", request.total_duration),
    };
    out.push_str(&format!(
        "{:>5}  {:<20} {:>5} {:>6} {:>6}\n",
        "ORDER", "NAME", "GROUP", "TRAVEL", "START"
    ));
    for p in &request.participants {
        out.push_str(&format!(
            "{:>5}  {:<20} {:>5} {:>5}s {:>5}s\n",
            p.attack_order, p.name, p.attack_group, p.time_to_destination, p.attack_start_time
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use salvo_core::Roster;

    use super::*;

    #[test]
    fn plan_table_lists_players_in_start_order() {
        let mut roster = Roster::new();
        roster.register("Slow", 20, None).unwrap();
        roster.register("Fast", 5, None).unwrap();
        let table = format_plan(&roster.plan(None).unwrap());

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Attack plan (20s total)");
        assert!(lines[2].contains("Slow") && lines[2].trim_end().ends_with("0s"));
        assert!(lines[3].contains("Fast") && lines[3].trim_end().ends_with("15s"));
    }
}

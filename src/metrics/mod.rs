use std::fmt::Write;

use crate::state::Snapshot;

/// Keep label values from breaking the line-oriented exposition format:
/// newlines, carriage returns, and tabs collapse to a single space,
/// double quotes get a backslash escape. Applied to every free-text
/// label value, process names included.
pub fn sanitize_label_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' | '\r' | '\t' => out.push(' '),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Render the snapshot as Prometheus exposition text.
///
/// Pure function of its inputs: seven gauge families in a fixed order,
/// each with one sample line per process in snapshot order. An empty
/// snapshot yields the headers alone. `now_ms` is the scrape time in
/// epoch milliseconds, used only for the uptime derivation.
pub fn render_metrics(snapshot: &Snapshot, now_ms: i64) -> String {
    let mut out = String::new();

    out.push_str(
        "# HELP pm2_status PM2 App process status: 1 if \"online\", 0 otherwise; label \"status\" shows the textual status\n\
         # TYPE pm2_status gauge\n",
    );
    for p in &snapshot.processes {
        let value = i32::from(p.pm2_env.status == "online");
        let _ = writeln!(
            out,
            "pm2_status{{process=\"{}\",pid=\"{}\",status=\"{}\"}} {}",
            sanitize_label_value(&p.name),
            p.pid,
            sanitize_label_value(&p.pm2_env.status),
            value,
        );
    }

    out.push_str(
        "# HELP pm2_branch_info PM2 App processes branch, revision, and comment: 1 if branch is non-empty, else 0\n\
         # TYPE pm2_branch_info gauge\n",
    );
    for p in &snapshot.processes {
        let v = &p.pm2_env.versioning;
        let value = i32::from(!v.branch.is_empty());
        let _ = writeln!(
            out,
            "pm2_branch_info{{process=\"{}\",pid=\"{}\",branch=\"{}\",revision=\"{}\",comment=\"{}\"}} {}",
            sanitize_label_value(&p.name),
            p.pid,
            sanitize_label_value(&v.branch),
            sanitize_label_value(&v.revision),
            sanitize_label_value(&v.comment),
            value,
        );
    }

    out.push_str(
        "# HELP pm2_memory_bytes PM2 App process memory usage in bytes\n\
         # TYPE pm2_memory_bytes gauge\n",
    );
    for p in &snapshot.processes {
        let _ = writeln!(
            out,
            "pm2_memory_bytes{{process=\"{}\",pid=\"{}\"}} {}",
            sanitize_label_value(&p.name),
            p.pid,
            p.monit.memory,
        );
    }

    out.push_str(
        "# HELP pm2_cpu_percent PM2 App process CPU usage in percentage\n\
         # TYPE pm2_cpu_percent gauge\n",
    );
    for p in &snapshot.processes {
        let _ = writeln!(
            out,
            "pm2_cpu_percent{{process=\"{}\",pid=\"{}\"}} {:.2}",
            sanitize_label_value(&p.name),
            p.pid,
            p.monit.cpu,
        );
    }

    out.push_str(
        "# HELP pm2_uptime_seconds PM2 App process uptime in seconds (calculated from \"pm_uptime\")\n\
         # TYPE pm2_uptime_seconds gauge\n",
    );
    for p in &snapshot.processes {
        if p.pm2_env.pm_uptime > 0 {
            // clamp to zero on clock skew
            let ms_since = (now_ms - p.pm2_env.pm_uptime).max(0);
            let _ = writeln!(
                out,
                "pm2_uptime_seconds{{process=\"{}\",pid=\"{}\"}} {:.2}",
                sanitize_label_value(&p.name),
                p.pid,
                ms_since as f64 / 1000.0,
            );
        } else {
            let _ = writeln!(
                out,
                "pm2_uptime_seconds{{process=\"{}\",pid=\"{}\"}} 0",
                sanitize_label_value(&p.name),
                p.pid,
            );
        }
    }

    out.push_str(
        "# HELP pm2_restart_count Number of restarts for a PM2 App process\n\
         # TYPE pm2_restart_count gauge\n",
    );
    for p in &snapshot.processes {
        let _ = writeln!(
            out,
            "pm2_restart_count{{process=\"{}\",pid=\"{}\"}} {}",
            sanitize_label_value(&p.name),
            p.pid,
            p.pm2_env.restart_time,
        );
    }

    out.push_str(
        "# HELP pm2_created_at_timestamp PM2 App process creation time in epoch milliseconds\n\
         # TYPE pm2_created_at_timestamp gauge\n",
    );
    for p in &snapshot.processes {
        let _ = writeln!(
            out,
            "pm2_created_at_timestamp{{process=\"{}\",pid=\"{}\"}} {}",
            sanitize_label_value(&p.name),
            p.pid,
            p.pm2_env.created_at,
        );
    }

    out
}

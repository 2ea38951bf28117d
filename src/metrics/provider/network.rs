use crate::error::ProviderError;
use crate::metrics::process::NetworkConnectionRow;

/// Renders a TCP state variant name (`SynSent`, `FinWait1`) the way netstat
/// prints it (`SYN_SENT`, `FIN_WAIT1`).
pub fn format_tcp_state(variant: &str) -> String {
    let mut out = String::with_capacity(variant.len() + 4);
    for (i, c) in variant.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

#[cfg(target_os = "linux")]
pub(super) fn connections() -> Result<Vec<NetworkConnectionRow>, ProviderError> {
    use crate::metrics::process::Protocol;
    use procfs::net::{TcpNetEntry, UdpNetEntry};
    use std::net::SocketAddr;

    fn endpoint(addr: &SocketAddr) -> String {
        if addr.ip().is_unspecified() && addr.port() == 0 {
            String::new()
        } else {
            addr.to_string()
        }
    }

    let owners = socket_owners();
    let owner = |inode: u64| -> (Option<u32>, Option<String>) {
        match owners.get(&inode) {
            Some((pid, name)) => (Some(*pid), name.clone()),
            None => (None, None),
        }
    };

    let mut tcp: Vec<TcpNetEntry> = procfs::net::tcp().map_err(unavailable)?;
    tcp.extend(procfs::net::tcp6().unwrap_or_default());
    let mut udp: Vec<UdpNetEntry> = procfs::net::udp().map_err(unavailable)?;
    udp.extend(procfs::net::udp6().unwrap_or_default());

    let mut rows = Vec::with_capacity(tcp.len() + udp.len());
    for entry in tcp {
        let (pid, process_name) = owner(entry.inode);
        rows.push(NetworkConnectionRow {
            protocol: Protocol::Tcp,
            local_address: endpoint(&entry.local_address),
            remote_address: endpoint(&entry.remote_address),
            status: format_tcp_state(&format!("{:?}", entry.state)),
            pid,
            process_name,
        });
    }
    for entry in udp {
        let (pid, process_name) = owner(entry.inode);
        rows.push(NetworkConnectionRow {
            protocol: Protocol::Udp,
            local_address: endpoint(&entry.local_address),
            remote_address: endpoint(&entry.remote_address),
            status: "NONE".to_string(),
            pid,
            process_name,
        });
    }
    Ok(rows)
}

#[cfg(target_os = "linux")]
fn unavailable(e: procfs::ProcError) -> ProviderError {
    ProviderError::Unavailable(format!("cannot read socket tables: {e}"))
}

/// Socket inode -> (pid, process name), from `/proc/<pid>/fd`.
///
/// Processes we may not inspect are skipped.
#[cfg(target_os = "linux")]
fn socket_owners() -> std::collections::HashMap<u64, (u32, Option<String>)> {
    use procfs::process::FDTarget;
    use std::collections::HashMap;

    let mut owners = HashMap::new();
    let Ok(processes) = procfs::process::all_processes() else {
        return owners;
    };
    for process in processes.flatten() {
        let Ok(fds) = process.fd() else {
            continue;
        };
        let Ok(pid) = u32::try_from(process.pid()) else {
            continue;
        };
        let mut name = None;
        for fd in fds.flatten() {
            if let FDTarget::Socket(inode) = fd.target {
                let comm = name
                    .get_or_insert_with(|| process.stat().ok().map(|s| s.comm))
                    .clone();
                owners.insert(inode, (pid, comm));
            }
        }
    }
    owners
}

/// Blank for wildcard peers (`0.0.0.0:0`, `[::]:0`, `*:*`).
fn peer(addr: &str) -> String {
    match addr {
        "*:*" | "0.0.0.0:0" | "[::]:0" | "*" => String::new(),
        addr => addr.to_string(),
    }
}

/// Parses `netstat -ano` as printed on Windows.
///
/// Header and banner lines are skipped, so localized output parses too.
/// UDP lines have no state column.
pub fn parse_netstat_ano(output: &str) -> Vec<NetworkConnectionRow> {
    use crate::metrics::process::Protocol;

    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<_> = line.split_whitespace().collect();
            let protocol = match fields.first()?.to_ascii_uppercase().as_str() {
                "TCP" | "TCPV6" => Protocol::Tcp,
                "UDP" | "UDPV6" => Protocol::Udp,
                _ => return None,
            };
            let (status, pid) = match (protocol, fields.len()) {
                (Protocol::Tcp, 5) => (fields[3], fields[4]),
                (Protocol::Udp, 4) => ("NONE", fields[3]),
                _ => return None,
            };
            Some(NetworkConnectionRow {
                protocol,
                local_address: fields[1].to_string(),
                remote_address: peer(fields[2]),
                // netstat says LISTENING where the other platforms say LISTEN
                status: match status {
                    "LISTENING" => "LISTEN".to_string(),
                    status => status.to_string(),
                },
                pid: pid.parse().ok().filter(|pid| *pid != 0),
                process_name: None,
            })
        })
        .collect()
}

/// Parses `lsof -nP -iTCP -iUDP` output.
///
/// Columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME [(STATE)].
/// lsof escapes blanks in COMMAND, so splitting on whitespace is safe.
pub fn parse_lsof(output: &str) -> Vec<NetworkConnectionRow> {
    use crate::metrics::process::Protocol;

    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<_> = line.split_whitespace().collect();
            if fields.len() < 9 {
                return None;
            }
            let protocol = match fields[7] {
                "TCP" => Protocol::Tcp,
                "UDP" => Protocol::Udp,
                _ => return None,
            };
            let pid = fields[1].parse().ok()?;
            let (local, remote) = match fields[8].split_once("->") {
                Some((local, remote)) => (local, peer(remote)),
                None => (fields[8], String::new()),
            };
            let status = match (protocol, fields.get(9)) {
                (Protocol::Tcp, Some(state)) => state.trim_matches(|c| c == '(' || c == ')'),
                _ => "NONE",
            };
            Some(NetworkConnectionRow {
                protocol,
                local_address: local.to_string(),
                remote_address: remote,
                status: status.to_string(),
                pid: Some(pid),
                process_name: Some(fields[0].replace("\\x20", " ")),
            })
        })
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn run(program: &str, args: &[&str]) -> Result<String, ProviderError> {
    use log::debug;

    let output = std::process::Command::new(program).args(args).output()?;
    if !output.status.success() {
        // lsof exits 1 when nothing matched
        debug!("{program} exited with {}", output.status);
        if output.stdout.is_empty() {
            return Ok(String::new());
        }
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(windows)]
pub(super) fn connections() -> Result<Vec<NetworkConnectionRow>, ProviderError> {
    run("netstat", &["-ano"]).map(|out| parse_netstat_ano(&out))
}

/// Sockets of other users' processes are only listed when running as root.
#[cfg(all(unix, not(target_os = "linux")))]
pub(super) fn connections() -> Result<Vec<NetworkConnectionRow>, ProviderError> {
    run("lsof", &["-nP", "-iTCP", "-iUDP"]).map(|out| parse_lsof(&out))
}

#[cfg(not(any(unix, windows)))]
pub(super) fn connections() -> Result<Vec<NetworkConnectionRow>, ProviderError> {
    Err(ProviderError::Unsupported("network connection listing"))
}

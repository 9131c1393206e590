use pscan::cli::{add_action, delete_action, list_action, scan_action};
use pscan::output::OutputFormat;
use pscan::scanner::ScanEngine;
use pscan::storage::{FileStore, HostStore};
use pscan::types::{HostList, Port, PortSpec};
use std::net::{Ipv4Addr, TcpListener};
use std::time::Duration;
use tempfile::TempDir;

/// A file-backed store in a fresh temporary directory, optionally seeded.
fn setup(hosts: &[&str], init_list: bool) -> (TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("pscan.hosts"));

    if init_list {
        let mut list = HostList::new();
        for host in hosts {
            list.add(host).unwrap();
        }
        store.save(&list).unwrap();
    }

    (dir, store)
}

fn strings(hosts: &[&str]) -> Vec<String> {
    hosts.iter().map(|h| h.to_string()).collect()
}

#[test]
fn test_host_actions() {
    let hosts = ["host1", "host2", "host3"];

    let (_dir, store) = setup(&hosts, false);
    let mut out = Vec::new();
    add_action(&mut out, &store, &strings(&hosts)).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Added host: host1\nAdded host: host2\nAdded host: host3\n"
    );

    let (_dir, store) = setup(&hosts, true);
    let mut out = Vec::new();
    list_action(&mut out, &store).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "host1\nhost2\nhost3\n");

    let (_dir, store) = setup(&hosts, true);
    let mut out = Vec::new();
    delete_action(&mut out, &store, &strings(&["host1", "host2"])).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Deleted host: host1\nDeleted host: host2\n"
    );
}

#[tokio::test]
async fn test_integration() {
    // Hosts that can never resolve, so the scan needs no network.
    let hosts = ["300.0.0.1", "300.0.0.2", "300.0.0.3"];
    let del_host = "300.0.0.2";
    let hosts_end = ["300.0.0.1", "300.0.0.3"];

    let (_dir, store) = setup(&hosts, false);
    let engine = ScanEngine::new();
    let mut out = Vec::new();

    let mut expected = String::new();
    for host in hosts {
        expected += &format!("Added host: {}\n", host);
    }
    expected += &hosts.join("\n");
    expected += "\n";
    expected += &format!("Deleted host: {}\n", del_host);
    expected += &hosts_end.join("\n");
    expected += "\n";
    for host in hosts_end {
        expected += &format!("{}: Host not found\n\n", host);
    }

    add_action(&mut out, &store, &strings(&hosts)).unwrap();
    list_action(&mut out, &store).unwrap();
    delete_action(&mut out, &store, &strings(&[del_host])).unwrap();
    list_action(&mut out, &store).unwrap();
    scan_action(
        &mut out,
        &store,
        &[],
        Duration::from_secs(1),
        &engine,
        OutputFormat::Plain,
    )
    .await
    .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scan_action() {
    let (_dir, store) = setup(&["127.0.0.1", "389.389.389.389"], true);

    let open = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let open_port = open.local_addr().unwrap().port();
    let closed = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let closed_port = closed.local_addr().unwrap().port();
    drop(closed);

    let ports: PortSpec = format!("{}, {}", open_port, closed_port).parse().unwrap();
    let mut out = Vec::new();

    scan_action(
        &mut out,
        &store,
        ports.ports(),
        Duration::from_secs(1),
        &ScanEngine::new(),
        OutputFormat::Plain,
    )
    .await
    .unwrap();

    let expected = format!(
        "127.0.0.1:\n\t{}: open\n\t{}: closed\n\n389.389.389.389: Host not found\n\n",
        open_port, closed_port
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[tokio::test]
async fn test_scan_action_csv() {
    let (_dir, store) = setup(&["389.389.389.389"], true);
    let ports = [Port::new(80).unwrap()];
    let mut out = Vec::new();

    scan_action(
        &mut out,
        &store,
        &ports,
        Duration::from_secs(1),
        &ScanEngine::new(),
        OutputFormat::Csv,
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "host,not_found,port,state\n389.389.389.389,true,,\n"
    );
}

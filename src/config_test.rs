use super::*;
use std::collections::HashMap;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = Config::from_lookup(lookup_from(&[])).unwrap();

    assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
    assert_eq!(config, Config::default());
}

#[test]
fn test_host_and_port_override() {
    let config = Config::from_lookup(lookup_from(&[
        (HOST_ENV, "127.0.0.1"),
        (PORT_ENV, "8080"),
    ]))
    .unwrap();

    assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
}

#[test]
fn test_ipv6_host() {
    let config = Config::from_lookup(lookup_from(&[(HOST_ENV, "::1")])).unwrap();

    assert_eq!(config.bind_addr, "[::1]:5000".parse().unwrap());
}

#[test]
fn test_blank_values_fall_back_to_defaults() {
    let config = Config::from_lookup(lookup_from(&[(HOST_ENV, "  "), (PORT_ENV, "")])).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn test_invalid_port_is_rejected() {
    let err = Config::from_lookup(lookup_from(&[(PORT_ENV, "70000")])).unwrap_err();

    assert_eq!(err, ConfigError::InvalidPort("70000".to_string()));
    assert!(err.to_string().contains(PORT_ENV));
}

#[test]
fn test_invalid_host_is_rejected() {
    let err = Config::from_lookup(lookup_from(&[(HOST_ENV, "localhost")])).unwrap_err();

    assert_eq!(err, ConfigError::InvalidHost("localhost".to_string()));
}

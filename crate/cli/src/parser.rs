//! Console line parsing: whitespace-separated tokens, the first being
//! the command, the rest `key=value` pairs. A `${name}` in value
//! position is replaced from the console's variable table.

use std::collections::HashMap;

/// First token of the line.
pub fn command(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or_default()
}

/// The raw value of a `key=value` pair, no variable substitution.
pub fn raw_value(line: &str, key: &str) -> Option<String> {
    for pair in line.split_whitespace() {
        if let Some((k, v)) = pair.split_once('=') {
            if k == key {
                return Some(v.to_owned());
            }
        }
    }
    None
}

/// Replace a `${name}` value with the stored variable, if any.
pub fn substitute(value: &str, variables: &HashMap<String, String>) -> String {
    if let Some(name) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        match variables.get(name) {
            Some(stored) => return stored.clone(),
            None => println!("No value stored for ({name})"),
        }
    }
    value.to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn command_is_the_first_token() {
        assert_eq!(command("create id=disk-0001"), "create");
        assert_eq!(command("   get uid=7"), "get");
        assert_eq!(command(""), "");
    }

    #[test]
    fn values_come_from_key_value_pairs() {
        let line = "locate id=SASED-name attribname2=ObjectType attribvalue2=SecretData";
        assert_eq!(raw_value(line, "id").as_deref(), Some("SASED-name"));
        assert_eq!(raw_value(line, "attribname2").as_deref(), Some("ObjectType"));
        assert_eq!(raw_value(line, "missing"), None);
        // the command token is not a pair
        assert_eq!(raw_value(line, "locate"), None);
    }

    #[test]
    fn variables_substitute_in_value_position() {
        let mut variables = HashMap::new();
        variables.insert("lastuid".to_owned(), "6307".to_owned());
        assert_eq!(substitute("${lastuid}", &variables), "6307");
        assert_eq!(substitute("${unknown}", &variables), "${unknown}");
        assert_eq!(substitute("6307", &variables), "6307");
    }
}

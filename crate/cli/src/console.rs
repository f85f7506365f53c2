//! Command handlers for the interactive console.
//!
//! They call the uniform client layer, which supports both KMIP protocol
//! dialects, and print their results with plain `println!` since the
//! console user is meant to see them. The variable table and the command
//! dispatch are fields and methods here; the protocol engine below knows
//! nothing about them.

use std::{collections::HashMap, fs, time::Instant};

use colored::Colorize;
use kmsc_client::{
    ActivateKeyRequest, ConfigurationSettings, CreateKeyRequest, DestroyKeyRequest,
    DiscoverRequest, GetAttributeRequest, GetKeyRequest, KmipClient, LocateRequest, QueryRequest,
    ReKeyRequest, RegisterRequest, RevokeKeyRequest, Secret,
};
use kmsc_kmip::kmip_0::kmip_types::{
    KeyFormatType, ObjectType, ProtocolVersion, QueryFunction, SecretDataType,
};
use tracing::debug;

use crate::parser;

/// The variable `create` and `locate` store their result under, for use
/// as `${lastuid}` in later commands.
const LAST_UID: &str = "lastuid";

pub struct Console {
    client: KmipClient,
    variables: HashMap<String, String>,
}

impl Console {
    #[must_use]
    pub fn new(settings: ConfigurationSettings) -> Self {
        Self {
            client: KmipClient::new(settings),
            variables: HashMap::new(),
        }
    }

    /// Execute one console line.
    pub fn execute(&mut self, line: &str) {
        let start = Instant::now();
        let command = parser::command(line).to_owned();
        match command.as_str() {
            "help" => self.help(),
            "env" => self.env(),
            "version" => self.version(line),
            "certs" => self.certs(line),
            "set" => self.set(line),
            "load" => self.load(line),
            "run" => self.run(line),
            "banner" => self.banner(line),
            "open" => self.open(line),
            "close" => self.close(),
            "discover" => self.discover(line),
            "query" => self.query(line),
            "create" => self.create(line),
            "activate" => self.activate(line),
            "get" => self.get(line),
            "locate" => self.locate(line),
            "revoke" => self.revoke(line),
            "destroy" => self.destroy(line),
            "clear" => self.clear(line),
            "register" => self.register(line),
            "getattribute" => self.get_attribute(line),
            "rekey" => self.rekey(line),
            _ => println!("No handler for: {line}"),
        }
        if self.client.settings.show_elapsed {
            println!("[elapsed={:?}] {command}", start.elapsed());
        }
    }

    /// A `key=value` from the line, with `${variable}` substitution.
    fn value(&self, line: &str, key: &str) -> Option<String> {
        parser::raw_value(line, key).map(|value| parser::substitute(&value, &self.variables))
    }

    fn store_settings(&self) {
        if self.client.settings.save_settings_to_file {
            if let Err(e) = self.client.settings.store() {
                println!("unable to store configuration settings, error: {e}");
            }
        }
    }

    // ---- session ----------------------------------------------------

    fn open(&mut self, line: &str) {
        debug!(line, "open");
        if let Some(ip) = self.value(line, "ip") {
            self.client.settings.kms_server_ip = ip.clone();
            println!("KmsServerIp set to: {ip}");
        }
        if let Some(port) = self.value(line, "port") {
            match port.parse::<u16>() {
                Ok(port) => {
                    self.client.settings.kms_server_port = port;
                    println!("KmsServerPort set to: {port}");
                }
                Err(_) => {
                    println!("invalid port: {port}");
                    return;
                }
            }
        }
        match self.client.open() {
            Ok(()) => println!(
                "TLS Connection opened with ({}:{})",
                self.client.settings.kms_server_ip, self.client.settings.kms_server_port
            ),
            Err(e) => println!("TLS Connection failed to open, error: {e}"),
        }
    }

    fn close(&mut self) {
        match self.client.close() {
            Ok(()) => println!(
                "TLS Connection closed with ({}:{})",
                self.client.settings.kms_server_ip, self.client.settings.kms_server_port
            ),
            Err(e) => println!("TLS Connection failed to close, error: {e}"),
        }
    }

    fn discover(&mut self, line: &str) {
        let mut client_versions = Vec::new();
        if let (Some(major), Some(minor)) = (self.value(line, "major"), self.value(line, "minor")) {
            if let (Ok(major), Ok(minor)) = (major.parse(), minor.parse()) {
                client_versions.push(ProtocolVersion::new(major, minor));
            }
        }
        match self.client.discover(&DiscoverRequest { client_versions }) {
            Ok(response) => {
                let versions: Vec<String> = response
                    .supported_versions
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("Discover results: [{}]", versions.join(", "));
                println!(
                    "kmip protocol version {} (service {})",
                    self.client.settings.protocol_version(),
                    self.client.settings.service_type
                );
            }
            Err(e) => println!("Discover failed, error: {e}"),
        }
    }

    fn query(&mut self, line: &str) {
        let operation = self.value(line, "op").unwrap_or_else(|| "1".to_owned());
        let mut query_functions = Vec::new();
        for op in operation.split(',') {
            match op
                .parse::<u32>()
                .ok()
                .and_then(QueryFunction::from_repr)
            {
                Some(function) => query_functions.push(function),
                None => {
                    println!("unknown query function: {op}");
                    return;
                }
            }
        }
        match self.client.query(&QueryRequest { query_functions }) {
            Ok(response) => {
                if !response.operations.is_empty() {
                    let names: Vec<String> =
                        response.operations.iter().map(ToString::to_string).collect();
                    println!("Operations: {}", names.join(", "));
                }
                if !response.object_types.is_empty() {
                    let names: Vec<String> = response
                        .object_types
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    println!("Object Types: {}", names.join(", "));
                }
                if let Some(vendor) = &response.vendor_identification {
                    println!("Vendor Identification: {vendor}");
                }
                for info in &response.capability_information {
                    println!("Capability Information: {info:?}");
                }
            }
            Err(e) => println!("Query failed, error: {e}"),
        }
    }

    // ---- keys -------------------------------------------------------

    fn create(&mut self, line: &str) {
        let Some(id) = self.value(line, "id") else {
            println!("create id=value is required, example: create id=ZAD0YA320000C7300BYS");
            return;
        };
        match self.client.create_key(&CreateKeyRequest::aes_256(&id)) {
            Ok(response) => {
                let uid = response.unique_identifier;
                self.variables.insert(LAST_UID.to_owned(), uid.clone());
                println!("key created for id ({id}) returned uid ({uid})");
            }
            Err(e) => println!("create key failed for id ({id}) with error: {e}"),
        }
    }

    fn activate(&mut self, line: &str) {
        let Some(uid) = self.value(line, "uid") else {
            println!("activate uid=value is required, example: activate uid=6201");
            return;
        };
        match self.client.activate_key(&ActivateKeyRequest {
            unique_identifier: uid.clone(),
        }) {
            Ok(response) => println!("key activated for uid ({})", response.unique_identifier),
            Err(e) => println!("activate key failed for uid ({uid}) with error: {e}"),
        }
    }

    fn get(&mut self, line: &str) {
        let Some(uid) = self.value(line, "uid") else {
            println!("get uid=value is required, example: get uid=6201");
            return;
        };
        match self.client.get_key(&GetKeyRequest {
            unique_identifier: uid.clone(),
        }) {
            Ok(response) => println!(
                "get key for uid ({}) type ({}) key ({})",
                response.unique_identifier, response.object_type, response.key_material
            ),
            Err(e) => println!("get key failed for uid ({uid}) with error: {e}"),
        }
    }

    fn locate(&mut self, line: &str) {
        let id = self.value(line, "id").unwrap_or_default();
        let mut attributes = Vec::new();
        for index in 1..=2 {
            if let (Some(name), Some(value)) = (
                self.value(line, &format!("attribname{index}")),
                self.value(line, &format!("attribvalue{index}")),
            ) {
                attributes.push((name, value));
            }
        }
        if id.is_empty() && attributes.is_empty() {
            println!(
                "locate id or attribute filters are required, example: locate \
                 id=SASED-M-2-14-name attribname2=ObjectType attribvalue2=SecretData"
            );
            return;
        }
        match self.client.locate(&LocateRequest {
            name: id.clone(),
            attributes,
        }) {
            Ok(response) => match response.unique_identifier() {
                Some(uid) => {
                    self.variables.insert(LAST_UID.to_owned(), uid.to_owned());
                    println!("locate key for id ({id}) returned uid ({uid})");
                }
                None => println!("locate key for id ({id}) returned no matches"),
            },
            Err(e) => println!("locate failed for id ({id}) with error: {e}"),
        }
    }

    fn revoke(&mut self, line: &str) {
        let Some(uid) = self.value(line, "uid") else {
            println!("revoke uid=value is required, example: revoke uid=6307");
            return;
        };
        match self.client.revoke_key(&RevokeKeyRequest::cessation(&uid)) {
            Ok(response) => println!(
                "revoke key succeeded for uid ({})",
                response.unique_identifier
            ),
            Err(e) => println!("revoke key failed for uid ({uid}) with error: {e}"),
        }
    }

    fn destroy(&mut self, line: &str) {
        let Some(uid) = self.value(line, "uid") else {
            println!("destroy uid=value is required, example: destroy uid=6307");
            return;
        };
        match self.client.destroy_key(&DestroyKeyRequest {
            unique_identifier: uid.clone(),
        }) {
            Ok(response) => println!(
                "destroy key succeeded for uid ({})",
                response.unique_identifier
            ),
            Err(e) => println!("destroy key failed for uid ({uid}) with error: {e}"),
        }
    }

    /// locate, revoke, and destroy a key based on its id
    fn clear(&mut self, line: &str) {
        let Some(id) = self.value(line, "id") else {
            println!("clear id=value is required, example: clear id=DISK01234");
            return;
        };
        let located = match self.client.locate(&LocateRequest {
            name: id.clone(),
            attributes: Vec::new(),
        }) {
            Ok(response) => response.unique_identifier().map(str::to_owned),
            Err(e) => {
                println!("locate failed for id ({id}), error: {e}");
                None
            }
        };
        let Some(uid) = located else {
            println!("clear key failed for id ({id})");
            return;
        };
        println!("locate key for id ({id}) returned uid ({uid})");

        let mut success = true;
        match self.client.revoke_key(&RevokeKeyRequest::cessation(&uid)) {
            Ok(_) => println!("revoke key succeeded for uid ({uid})"),
            Err(e) => {
                println!("revoke key failed for uid ({uid}) with error: {e}");
                success = false;
            }
        }
        match self.client.destroy_key(&DestroyKeyRequest {
            unique_identifier: uid.clone(),
        }) {
            Ok(_) => println!("destroy key succeeded for uid ({uid})"),
            Err(e) => {
                println!("destroy key failed for uid ({uid}) with error: {e}");
                success = false;
            }
        }
        if success {
            println!("clear key succeeded for id ({id})");
        } else {
            println!("clear key failed for id ({id})");
        }
    }

    fn register(&mut self, line: &str) {
        let Some(keymaterial) = self.value(line, "keymaterial") else {
            println!("register keymaterial=value is required");
            return;
        };
        let name = self.value(line, "name").unwrap_or_default();
        if name.is_empty() {
            println!("register name=value is required");
            return;
        }

        let object_type = match self.value(line, "objtype").as_deref() {
            Some("symmetrickey") => ObjectType::SymmetricKey,
            _ => ObjectType::SecretData,
        };
        let key_format = match self.value(line, "keyformat").as_deref() {
            Some("raw") => KeyFormatType::Raw,
            _ => KeyFormatType::Opaque,
        };
        let secret_data_type = match self.value(line, "datatype").as_deref() {
            Some("Seed" | "seed") => SecretDataType::Seed,
            _ => SecretDataType::Password,
        };

        let mut attributes = Vec::new();
        for index in 1..=4 {
            if let (Some(attr_name), Some(attr_value)) = (
                self.value(line, &format!("attribname{index}")),
                self.value(line, &format!("attribvalue{index}")),
            ) {
                attributes.push((attr_name, attr_value));
            }
        }

        let request = RegisterRequest {
            object_type,
            key_material: Secret::from(keymaterial.as_str()),
            key_format,
            secret_data_type,
            name: name.clone(),
            object_group: self.value(line, "objgrp"),
            attributes,
        };
        match self.client.register(&request) {
            Ok(response) => println!(
                "register key succeeded for uid ({})",
                response.unique_identifier
            ),
            Err(e) => println!("register key failed with error: {e}"),
        }
    }

    fn get_attribute(&mut self, line: &str) {
        let Some(uid) = self.value(line, "uid") else {
            println!(
                "getattribute uid=value is required, example: getattribute uid=6307 \
                 attribname1=x-CustomAttribute4"
            );
            return;
        };
        let attribute_name = self.value(line, "attribname1").unwrap_or_default();
        match self.client.get_attribute(&GetAttributeRequest {
            unique_identifier: uid.clone(),
            attribute_name,
        }) {
            Ok(response) => println!(
                "get attribute succeeded for uid ({}) with attribute: {}",
                response.unique_identifier,
                response.attribute.unwrap_or_else(|| "none".to_owned())
            ),
            Err(e) => println!("get attribute failed for uid ({uid}) with error: {e}"),
        }
    }

    fn rekey(&mut self, line: &str) {
        let Some(uid) = self.value(line, "uid") else {
            println!("rekey uid=value is required, example: rekey uid=6201");
            return;
        };
        match self.client.rekey(&ReKeyRequest {
            unique_identifier: uid.clone(),
        }) {
            Ok(response) => println!("rekey key new uid ({})", response.unique_identifier),
            Err(e) => println!("rekey key failed for uid ({uid}) with error: {e}"),
        }
    }

    // ---- settings ---------------------------------------------------

    fn version(&mut self, line: &str) {
        let major = self.value(line, "major").unwrap_or_else(|| "1".to_owned());
        let minor = self.value(line, "minor").unwrap_or_else(|| "4".to_owned());
        match (major.parse(), minor.parse()) {
            (Ok(major), Ok(minor)) => {
                self.client
                    .settings
                    .adopt_version(ProtocolVersion::new(major, minor));
                println!("kmip protocol version {major}.{minor}");
                self.store_settings();
            }
            _ => println!("invalid version: {major}.{minor}"),
        }
    }

    fn certs(&mut self, line: &str) {
        let mut updated = false;
        if let Some(ca) = self.value(line, "ca") {
            self.client.settings.cert_auth_file = ca.clone();
            println!("CertAuthFile set to: {ca}");
            updated = true;
        }
        if let Some(key) = self.value(line, "key") {
            self.client.settings.key_file = key.clone();
            println!("KeyFile set to: {key}");
            updated = true;
        }
        if let Some(cert) = self.value(line, "cert") {
            self.client.settings.cert_file = cert.clone();
            println!("CertFile set to: {cert}");
            updated = true;
        }
        if updated {
            self.store_settings();
        }
    }

    fn set(&mut self, line: &str) {
        if let Some(ip) = self.value(line, "ip") {
            self.client.settings.kms_server_ip = ip.clone();
            println!("KmsServerIp set to: {ip}");
        }
        if let Some(port) = self.value(line, "port") {
            match port.parse::<u16>() {
                Ok(port) => {
                    self.client.settings.kms_server_port = port;
                    println!("KmsServerPort set to: {port}");
                }
                Err(_) => println!("invalid port: {port}"),
            }
        }
        if let Some(elapsed) = self.value(line, "elapsed") {
            let flag = elapsed.eq_ignore_ascii_case("true");
            self.client.settings.show_elapsed = flag;
            println!("ShowElapsed set to: {flag}");
        }
        if let Some(timeout) = self.value(line, "timeout") {
            match timeout.parse::<u64>() {
                Ok(secs) => {
                    self.client.settings.timeout_secs = Some(secs);
                    println!("Timeout set to: {secs}s");
                }
                Err(_) => println!("invalid timeout: {timeout}"),
            }
        }
        if self.value(line, "level").is_some() {
            println!("log level is fixed at startup; restart with -d for debug");
        }
        self.store_settings();
    }

    fn load(&mut self, line: &str) {
        let Some(filename) = self.value(line, "file") else {
            println!("load file=value is required");
            return;
        };
        match ConfigurationSettings::restore(Some(&filename)) {
            Ok(settings) => {
                self.client.settings = settings;
                println!("configuration settings read from ({filename})");
            }
            Err(e) => println!("unable to restore configuration settings, error: {e}"),
        }
    }

    /// Execute all commands contained in a file, line by line, through
    /// the same dispatcher (so `${lastuid}` flows across lines).
    fn run(&mut self, line: &str) {
        let Some(filename) = self.value(line, "file") else {
            println!("run file=value is required");
            return;
        };
        let content = match fs::read_to_string(&filename) {
            Ok(content) => content,
            Err(e) => {
                println!("File ({filename}) does not exist or is unreadable: {e}");
                return;
            }
        };
        for script_line in content.lines() {
            let script_line = script_line.trim();
            if !script_line.is_empty() {
                debug!(line = script_line, "script");
                self.execute(script_line);
            }
        }
    }

    fn banner(&mut self, line: &str) {
        let title = self.value(line, "title").unwrap_or_default();
        println!("\n{} {} {}\n", "=".repeat(40), title, "=".repeat(40));
    }

    fn env(&self) {
        let settings = &self.client.settings;
        let width = 30;
        println!();
        println!(
            "  {:>width$}  {}",
            "ShowElapsed".white(),
            settings.show_elapsed.to_string().green()
        );
        match self.client.peer() {
            Some(peer) => println!("  {:>width$}  {}", "Connection".white(), peer.green()),
            None => println!("  {:>width$}  {}", "Connection".white(), "closed".green()),
        }
        println!();
        println!(
            "  {:>width$}  {}",
            "KmsServerIp".white(),
            settings.kms_server_ip.green()
        );
        println!(
            "  {:>width$}  {}",
            "KmsServerPort".white(),
            settings.kms_server_port.to_string().green()
        );
        println!(
            "  {:>width$}  {}",
            "CertAuthFile".white(),
            settings.cert_auth_file.green()
        );
        println!(
            "  {:>width$}  {}",
            "CertFile".white(),
            settings.cert_file.green()
        );
        println!(
            "  {:>width$}  {}",
            "KeyFile".white(),
            settings.key_file.green()
        );
        println!();
        println!(
            "  {:>width$}  {}",
            "ProtocolVersion".white(),
            settings.protocol_version().to_string().green()
        );
        println!(
            "  {:>width$}  {}",
            "ServiceType".white(),
            settings.service_type.to_string().green()
        );
    }

    fn help(&self) {
        let entry = |command: &str, options: &str, comment: &str| {
            println!(
                "  {:>20}  {:<50}  {}",
                command.white(),
                options.yellow(),
                format!("// {comment}").green()
            );
        };
        println!();
        entry("help", "", "display this information, key=value pairs");
        entry("env", "", "display all configuration settings");
        entry("run", "file=<value>", "execute all commands contained in a file");
        entry("load", "file=<value>", "load configuration settings from a file");
        entry("set", "[ip=<value>] [port=<value>]", "set the ip and port for the kms server");
        entry("set", "[elapsed=<true|false>] [timeout=<secs>]", "console and transport tuning");
        entry("version", "[major=<value>] [minor=<value>]", "change the KMIP protocol version");
        entry("certs", "[ca=<value>] [key=<value>] [cert=<value>]", "change the KMS certificate files");
        println!();
        entry("open", "[ip=<value>] [port=<value>]", "open a TLS session, ip and port are optional");
        entry("close", "", "close the TLS session");
        entry("discover", "[major=<value> minor=<value>]", "discover versions supported by a KMS server");
        entry("query", "[op=<value,...>]", "query a KMS server, e.g. op=1,3");
        println!();
        entry("create", "id=<value>", "create a key based on a id, uid is displayed");
        entry("activate", "uid=<value>", "activate a key based on a uid");
        entry("get", "uid=<value>", "get a key based on a uid, key is displayed");
        entry("locate", "id=<value>", "locate a uid based on a id");
        entry("revoke", "uid=<value>", "revoke a key based on a uid");
        entry("destroy", "uid=<value>", "destroy a key based on a uid");
        entry("clear", "id=<value>", "locate, revoke, and destroy a key");
        entry("rekey", "uid=<value>", "replace the key material behind a uid");
        println!();
        entry("register", "keymaterial=<value> name=<value>", "register a new value");
        entry("getattribute", "uid=<value> attribname1=<value>", "return attribute details for a uid");
        println!();
        println!(
            "  {}",
            "${lastuid} holds the uid returned by the last create or locate".green()
        );
    }
}

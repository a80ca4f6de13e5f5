//! Service detection based on well-known port numbers.
//!
//! The catalog is a plain value built once when the scanner module is
//! initialized and handed to the engine by reference. It is never mutated
//! or reloaded during a run.

/// Name returned when no entry matches.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// A single (port, protocol) to service-name mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceEntry {
    pub port: u16,
    pub name: &'static str,
    /// Protocols served on this port: "tcp", "udp" or "tcp/udp".
    pub protocol: &'static str,
}

const fn entry(port: u16, name: &'static str, protocol: &'static str) -> ServiceEntry {
    ServiceEntry {
        port,
        name,
        protocol,
    }
}

/// Common services, in ascending port order.
const COMMON_SERVICES: &[ServiceEntry] = &[
    entry(20, "ftp-data", "tcp"),
    entry(21, "ftp", "tcp"),
    entry(22, "ssh", "tcp"),
    entry(23, "telnet", "tcp"),
    entry(25, "smtp", "tcp"),
    entry(53, "dns", "tcp/udp"),
    entry(67, "dhcp", "udp"),
    entry(68, "dhcp", "udp"),
    entry(69, "tftp", "udp"),
    entry(80, "http", "tcp"),
    entry(110, "pop3", "tcp"),
    entry(111, "rpcbind", "tcp/udp"),
    entry(123, "ntp", "udp"),
    entry(135, "msrpc", "tcp"),
    entry(137, "netbios-ns", "udp"),
    entry(138, "netbios-dgm", "udp"),
    entry(139, "netbios-ssn", "tcp"),
    entry(143, "imap", "tcp"),
    entry(161, "snmp", "udp"),
    entry(162, "snmptrap", "udp"),
    entry(389, "ldap", "tcp"),
    entry(443, "https", "tcp"),
    entry(445, "microsoft-ds", "tcp"),
    entry(465, "smtps", "tcp"),
    entry(514, "syslog", "udp"),
    entry(587, "smtp", "tcp"),
    entry(636, "ldaps", "tcp"),
    entry(993, "imaps", "tcp"),
    entry(995, "pop3s", "tcp"),
    entry(1080, "socks", "tcp"),
    entry(1433, "ms-sql-s", "tcp"),
    entry(1521, "oracle", "tcp"),
    entry(1723, "pptp", "tcp"),
    entry(1883, "mqtt", "tcp"),
    entry(1900, "upnp", "udp"),
    entry(2049, "nfs", "tcp/udp"),
    entry(2082, "cpanel", "tcp"),
    entry(2083, "cpanel", "tcp"),
    entry(2086, "whm", "tcp"),
    entry(2087, "whm", "tcp"),
    entry(2095, "webmail", "tcp"),
    entry(2096, "webmail", "tcp"),
    entry(2181, "zookeeper", "tcp"),
    entry(2375, "docker", "tcp"),
    entry(2376, "docker", "tcp"),
    entry(3000, "nodejs", "tcp"),
    entry(3306, "mysql", "tcp"),
    entry(3389, "ms-wbt-server", "tcp"),
    entry(3690, "svn", "tcp"),
    entry(4000, "remoteanything", "tcp"),
    entry(4040, "yo", "tcp"),
    entry(4200, "angular", "tcp"),
    entry(4369, "epmd", "tcp"),
    entry(5000, "upnp", "tcp"),
    entry(5432, "postgresql", "tcp"),
    entry(5601, "kibana", "tcp"),
    entry(5672, "amqp", "tcp"),
    entry(5900, "vnc", "tcp"),
    entry(5984, "couchdb", "tcp"),
    entry(6379, "redis", "tcp"),
    entry(7001, "weblogic", "tcp"),
    entry(7002, "weblogic", "tcp"),
    entry(8000, "http-alt", "tcp"),
    entry(8008, "http-alt", "tcp"),
    entry(8080, "http-proxy", "tcp"),
    entry(8081, "http-proxy", "tcp"),
    entry(8088, "http-alt", "tcp"),
    entry(8089, "splunk", "tcp"),
    entry(8443, "https-alt", "tcp"),
    entry(8888, "http-alt", "tcp"),
    entry(9000, "sonar", "tcp"),
    entry(9001, "tor", "tcp"),
    entry(9042, "cassandra", "tcp"),
    entry(9092, "kafka", "tcp"),
    entry(9200, "elasticsearch", "tcp"),
    entry(9300, "elasticsearch", "tcp"),
    entry(9418, "git", "tcp"),
    entry(11211, "memcache", "tcp"),
    entry(15672, "rabbitmq", "tcp"),
    entry(27017, "mongodb", "tcp"),
    entry(27018, "mongodb", "tcp"),
    entry(28017, "mongodb", "tcp"),
    entry(50000, "db2", "tcp"),
    entry(50070, "hadoop", "tcp"),
    entry(61616, "activemq", "tcp"),
];

/// Read-only port/protocol to service-name table.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    entries: Vec<ServiceEntry>,
}

impl ServiceCatalog {
    /// Build the catalog of common services.
    pub fn new() -> Self {
        Self {
            entries: COMMON_SERVICES.to_vec(),
        }
    }

    /// Build a catalog from custom entries.
    pub fn from_entries(entries: Vec<ServiceEntry>) -> Self {
        Self { entries }
    }

    /// Look up the service name for a port.
    ///
    /// Matches on the exact port and on `protocol` being a substring of the
    /// entry's protocol field, so "tcp" matches a "tcp/udp" entry. Returns
    /// [`UNKNOWN_SERVICE`] if nothing matches.
    pub fn lookup(&self, port: u16, protocol: &str) -> &'static str {
        self.entries
            .iter()
            .find(|e| e.port == port && e.protocol.contains(protocol))
            .map_or(UNKNOWN_SERVICE, |e| e.name)
    }

    /// Number of entries in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

//! Subset of lnd's `lnrpc` messages used by the bridge.
//!
//! Field numbers follow lnd's `lightning.proto`. Fields not listed here are
//! skipped by prost on decode.

use std::fmt;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetInfoRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetInfoResponse {
    /// The identity pubkey of the current node.
    #[prost(string, tag = "1")]
    pub identity_pubkey: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub alias: ::prost::alloc::string::String,
    #[prost(uint32, tag = "3")]
    pub num_pending_channels: u32,
    #[prost(uint32, tag = "4")]
    pub num_active_channels: u32,
    #[prost(uint32, tag = "5")]
    pub num_peers: u32,
    #[prost(uint32, tag = "6")]
    pub block_height: u32,
    #[prost(string, tag = "8")]
    pub block_hash: ::prost::alloc::string::String,
    #[prost(bool, tag = "9")]
    pub synced_to_chain: bool,
    #[prost(string, repeated, tag = "12")]
    pub uris: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(int64, tag = "13")]
    pub best_header_timestamp: i64,
    #[prost(string, tag = "14")]
    pub version: ::prost::alloc::string::String,
    #[prost(uint32, tag = "15")]
    pub num_inactive_channels: u32,
    #[prost(message, repeated, tag = "16")]
    pub chains: ::prost::alloc::vec::Vec<Chain>,
    #[prost(string, tag = "17")]
    pub color: ::prost::alloc::string::String,
    #[prost(bool, tag = "18")]
    pub synced_to_graph: bool,
    #[prost(string, tag = "20")]
    pub commit_hash: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Chain {
    #[prost(string, tag = "1")]
    pub chain: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub network: ::prost::alloc::string::String,
}

/// AddInvoice input. An all-default value asks lnd for an any-amount invoice.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Invoice {
    #[prost(string, tag = "1")]
    pub memo: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "3")]
    pub r_preimage: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub r_hash: ::prost::alloc::vec::Vec<u8>,
    /// Value in satoshis. Mutually exclusive with `value_msat`.
    #[prost(int64, tag = "5")]
    pub value: i64,
    #[prost(string, tag = "9")]
    pub payment_request: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "10")]
    pub description_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "11")]
    pub expiry: i64,
    #[prost(bool, tag = "15")]
    pub private: bool,
    #[prost(int64, tag = "23")]
    pub value_msat: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddInvoiceResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub r_hash: ::prost::alloc::vec::Vec<u8>,
    /// bech32 encoded payment request.
    #[prost(string, tag = "2")]
    pub payment_request: ::prost::alloc::string::String,
    #[prost(uint64, tag = "16")]
    pub add_index: u64,
    #[prost(bytes = "vec", tag = "17")]
    pub payment_addr: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub dest: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amt: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub payment_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "6")]
    pub payment_request: ::prost::alloc::string::String,
    #[prost(int64, tag = "12")]
    pub amt_msat: i64,
    #[prost(bool, tag = "14")]
    pub allow_self_payment: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendResponse {
    #[prost(string, tag = "1")]
    pub payment_error: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub payment_preimage: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub payment_route: ::core::option::Option<Route>,
    #[prost(bytes = "vec", tag = "4")]
    pub payment_hash: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Route {
    #[prost(uint32, tag = "1")]
    pub total_time_lock: u32,
    #[prost(int64, tag = "2")]
    pub total_fees: i64,
    #[prost(int64, tag = "3")]
    pub total_amt: i64,
    #[prost(message, repeated, tag = "4")]
    pub hops: ::prost::alloc::vec::Vec<Hop>,
    #[prost(int64, tag = "5")]
    pub total_fees_msat: i64,
    #[prost(int64, tag = "6")]
    pub total_amt_msat: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Hop {
    #[prost(uint64, tag = "1")]
    pub chan_id: u64,
    #[prost(int64, tag = "3")]
    pub amt_to_forward: i64,
    #[prost(int64, tag = "4")]
    pub fee: i64,
    #[prost(uint32, tag = "5")]
    pub expiry: u32,
    #[prost(int64, tag = "6")]
    pub amt_to_forward_msat: i64,
    #[prost(int64, tag = "7")]
    pub fee_msat: i64,
    #[prost(string, tag = "8")]
    pub pub_key: ::prost::alloc::string::String,
}

// Compact protobuf text format: one line, default-valued fields omitted,
// strings and bytes quoted with C-style escapes.

struct Text<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    first: bool,
}

fn write_escaped(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &b in bytes {
        match b {
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\{:03o}", b)?,
        }
    }
    f.write_str("\"")
}

impl Text<'_, '_> {
    fn sep(&mut self) -> fmt::Result {
        if !self.first {
            self.f.write_str(" ")?;
        }
        self.first = false;
        Ok(())
    }

    fn bytes(&mut self, name: &str, v: &[u8]) -> fmt::Result {
        if v.is_empty() {
            return Ok(());
        }
        self.sep()?;
        write!(self.f, "{}:", name)?;
        write_escaped(self.f, v)
    }

    fn int<T: fmt::Display + Default + PartialEq>(&mut self, name: &str, v: T) -> fmt::Result {
        if v == T::default() {
            return Ok(());
        }
        self.sep()?;
        write!(self.f, "{}:{}", name, v)
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = Text { f, first: true };
        t.int("chan_id", self.chan_id)?;
        t.int("amt_to_forward", self.amt_to_forward)?;
        t.int("fee", self.fee)?;
        t.int("expiry", self.expiry)?;
        t.int("amt_to_forward_msat", self.amt_to_forward_msat)?;
        t.int("fee_msat", self.fee_msat)?;
        t.bytes("pub_key", self.pub_key.as_bytes())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = Text { f, first: true };
        t.int("total_time_lock", self.total_time_lock)?;
        t.int("total_fees", self.total_fees)?;
        t.int("total_amt", self.total_amt)?;
        for hop in &self.hops {
            t.sep()?;
            write!(t.f, "hops:<{}>", hop)?;
        }
        t.int("total_fees_msat", self.total_fees_msat)?;
        t.int("total_amt_msat", self.total_amt_msat)
    }
}

/// Text form returned by `/pay_invoice`.
impl fmt::Display for SendResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = Text { f, first: true };
        t.bytes("payment_error", self.payment_error.as_bytes())?;
        t.bytes("payment_preimage", &self.payment_preimage)?;
        if let Some(route) = &self.payment_route {
            t.sep()?;
            write!(t.f, "payment_route:<{}>", route)?;
        }
        t.bytes("payment_hash", &self.payment_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_payment_renders_error_only() {
        let resp = SendResponse {
            payment_error: "unable to find a path to destination".into(),
            ..Default::default()
        };
        assert_eq!(resp.to_string(), "payment_error:\"unable to find a path to destination\"");
    }

    #[test]
    fn settled_payment_renders_route_and_escapes_bytes() {
        let resp = SendResponse {
            payment_error: String::new(),
            payment_preimage: vec![b'a', 0x00, 0xff],
            payment_route: Some(Route {
                total_time_lock: 144,
                total_amt: 1000,
                hops: vec![Hop { chan_id: 7, fee_msat: 1000, ..Default::default() }],
                total_fees_msat: 1000,
                ..Default::default()
            }),
            payment_hash: b"h\"".to_vec(),
        };
        assert_eq!(
            resp.to_string(),
            "payment_preimage:\"a\\000\\377\" \
             payment_route:<total_time_lock:144 total_amt:1000 hops:<chan_id:7 fee_msat:1000> total_fees_msat:1000> \
             payment_hash:\"h\\\"\""
        );
    }

    #[test]
    fn empty_response_renders_empty() {
        assert_eq!(SendResponse::default().to_string(), "");
    }
}

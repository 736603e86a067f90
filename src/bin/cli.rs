//! tntproto CLI Client
//!
//! One-shot requests against a server, and a dumper for captured traffic.

use std::fs::File;
use std::process;

use clap::{Parser, Subcommand};
use tntproto::iter::{Cursor, ReplyStream, RequestStream};
use tntproto::protocol::{Reply, Request, RequestBody, UpdateOpKind};
use tntproto::{Config, Connection, Flags, Tuple, TupleList, UpdateOpList};
use tracing_subscriber::{fmt, EnvFilter};

/// tntproto CLI
#[derive(Parser, Debug)]
#[command(name = "tnt-cli")]
#[command(about = "Client for the Box binary protocol")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:33013")]
    server: String,

    /// Socket timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server
    Ping,

    /// Insert a tuple
    Insert {
        space: u32,

        /// Tuple fields (decimal numbers that fit in 32 bits are sent as integers)
        fields: Vec<String>,

        /// Only replace an existing tuple
        #[arg(long, conflicts_with = "add")]
        replace: bool,

        /// Only add a new tuple
        #[arg(long)]
        add: bool,
    },

    /// Select tuples by key
    Select {
        space: u32,

        /// One single-field key per argument; matches are OR'd
        keys: Vec<String>,

        #[arg(short, long, default_value = "0")]
        index: u32,

        #[arg(long, default_value = "0")]
        offset: u32,

        #[arg(long, default_value_t = u32::MAX)]
        limit: u32,
    },

    /// Delete a tuple by key
    Delete {
        space: u32,

        /// Key fields
        key: Vec<String>,
    },

    /// Update the tuple with a single-field key
    Update {
        space: u32,

        key: String,

        /// Assign a field: FIELD=VALUE
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Add to an integer field: FIELD=N
        #[arg(long = "add", value_name = "FIELD=N")]
        add: Vec<String>,

        /// Delete a field
        #[arg(long = "delete", value_name = "FIELD")]
        delete: Vec<u32>,
    },

    /// Call a stored procedure
    Call {
        proc_name: String,

        args: Vec<String>,
    },

    /// Print the frames of a capture file
    Dump {
        file: String,

        /// The capture holds replies rather than requests
        #[arg(long)]
        replies: bool,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,tntproto=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> tntproto::Result<()> {
    let request = match args.command {
        Commands::Dump { file, replies } => return dump(&file, replies),
        Commands::Ping => Request::ping(),
        Commands::Insert {
            space,
            fields,
            replace,
            add,
        } => {
            let mut flags = Flags::RETURN_TUPLE;
            if replace {
                flags |= Flags::REPLACE;
            }
            if add {
                flags |= Flags::ADD;
            }
            Request::insert(space, flags, parse_tuple(&fields))
        }
        Commands::Select {
            space,
            keys,
            index,
            offset,
            limit,
        } => {
            let keys: TupleList = keys.iter().map(|k| parse_tuple([k])).collect();
            Request::select(space, index, offset, limit, keys)
        }
        Commands::Delete { space, key } => {
            Request::delete(space, Flags::RETURN_TUPLE, parse_tuple(&key))
        }
        Commands::Update {
            space,
            key,
            set,
            add,
            delete,
        } => {
            let mut ops = UpdateOpList::new();
            for assignment in &set {
                let (field_no, value) = parse_assignment(assignment)?;
                ops.add_assign(field_no, &parse_field(value))?;
            }
            for increment in &add {
                let (field_no, value) = parse_assignment(increment)?;
                let n: u64 = value.parse().map_err(|_| {
                    tntproto::TntError::BadValue(format!("'{}' is not an integer", value))
                })?;
                match u32::try_from(n) {
                    Ok(n) => ops.add_arith(field_no, UpdateOpKind::Add, n)?,
                    Err(_) => ops.add_arith(field_no, UpdateOpKind::Add, n)?,
                };
            }
            for field_no in delete {
                ops.add_delete(field_no)?;
            }
            Request::update(space, Flags::RETURN_TUPLE, parse_tuple([&key]), ops)
        }
        Commands::Call { proc_name, args } => {
            Request::call(Flags::NONE, proc_name, parse_tuple(&args))
        }
    };

    let config = Config::builder()
        .server_addr(&args.server)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();
    let mut conn = Connection::connect(&config)?;
    let reply = conn.request(&request)?;
    print_reply(&reply);
    if !reply.is_ok() {
        process::exit(2);
    }
    Ok(())
}

fn dump(path: &str, replies: bool) -> tntproto::Result<()> {
    let file = File::open(path)?;
    tracing::info!("Dumping {} from {}", if replies { "replies" } else { "requests" }, path);

    if replies {
        let mut stream = ReplyStream::new(file);
        while stream.advance() {
            if let Some(reply) = stream.current() {
                print_reply(reply);
            }
        }
        return match stream.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        };
    }

    let mut stream = RequestStream::new(file);
    while stream.advance() {
        if let Some(request) = stream.current() {
            print_request(request);
        }
    }
    match stream.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_reply(reply: &Reply) {
    if !reply.is_ok() {
        println!(
            "{} #{}: error {} (status {}): {}",
            reply.op_type,
            reply.request_id,
            reply.error_code(),
            reply.completion_status(),
            reply.error.as_deref().unwrap_or("")
        );
        return;
    }
    match reply.row_count {
        None => println!("{} #{}: ok", reply.op_type, reply.request_id),
        Some(count) if reply.rows.is_empty() => {
            println!("{} #{}: ok, {} affected", reply.op_type, reply.request_id, count)
        }
        Some(count) => {
            println!("{} #{}: ok, {} rows", reply.op_type, reply.request_id, count);
            for row in &reply.rows {
                println!("  {}", row);
            }
        }
    }
}

fn print_request(request: &Request) {
    let id = request.request_id;
    match &request.body {
        RequestBody::Ping => println!("ping #{}", id),
        RequestBody::Insert(i) => {
            println!("insert #{} space {} flags {}: {}", id, i.space, i.flags.bits(), i.tuple)
        }
        RequestBody::Delete(d) => println!("delete #{} space {}: {}", id, d.space, d.key),
        RequestBody::Update(u) => {
            println!("update #{} space {} key {}: {} ops", id, u.space, u.key, u.ops.len());
            for op in &u.ops {
                println!("  field {} {:?} ({} bytes)", op.field_no, op.kind, op.arg.len());
            }
        }
        RequestBody::Select(s) => {
            println!(
                "select #{} space {} index {} offset {} limit {}",
                id, s.space, s.index, s.offset, s.limit
            );
            for key in &s.keys {
                println!("  {}", key);
            }
        }
        RequestBody::Call(c) => println!("call #{} {}{}", id, c.proc_name, c.args),
    }
}

/// Decimal text that fits in 32 bits becomes a 4-byte integer field
fn parse_field(text: &str) -> Vec<u8> {
    match text.parse::<u32>() {
        Ok(n) if !text.starts_with('+') => n.to_le_bytes().to_vec(),
        _ => text.as_bytes().to_vec(),
    }
}

fn parse_tuple<I, S>(fields: I) -> Tuple
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| parse_field(f.as_ref()))
        .collect()
}

fn parse_assignment(text: &str) -> tntproto::Result<(u32, &str)> {
    let (field, value) = text.split_once('=').ok_or_else(|| {
        tntproto::TntError::BadValue(format!("expected FIELD=VALUE, got '{}'", text))
    })?;
    let field_no = field
        .parse()
        .map_err(|_| tntproto::TntError::BadValue(format!("'{}' is not a field number", field)))?;
    Ok((field_no, value))
}

// PostgreSQL connector (`postgres` feature)
//
// The statement is prepared once for column names and types, then run over
// the simple query protocol so every value arrives as text. NUMERIC and the
// other types without a native Rust mapping are parsed from that text.

use ::postgres::types::Type;
use ::postgres::{Config, NoTls, SimpleQueryMessage};
use tabrecon_recon::{Dataset, Value};

use super::{push_result_row, result_dataset, ConnectionParams, Connector};
use crate::error::AcquisitionError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;

pub struct PostgresConnector;

impl Connector for PostgresConnector {
    fn query(&self, params: &ConnectionParams, sql: &str) -> Result<Dataset, AcquisitionError> {
        let host = params.host.as_deref().unwrap_or(DEFAULT_HOST);
        let mut config = Config::new();
        config
            .host(host)
            .port(params.port.unwrap_or(DEFAULT_PORT))
            .dbname(params.database.as_str());
        if let Some(user) = &params.user {
            config.user(user.as_str());
        }
        if let Some(password) = &params.password {
            config.password(password.expose());
        }
        let mut client = config.connect(NoTls).map_err(pg_error)?;

        let statement = client.prepare(sql).map_err(pg_error)?;
        let columns: Vec<(String, Type)> = statement
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.type_().clone()))
            .collect();

        let origin = format!("{host}/{}", params.database);
        let mut dataset =
            result_dataset(&origin, columns.iter().map(|(name, _)| name.clone()).collect())?;

        for message in client.simple_query(sql).map_err(pg_error)? {
            if let SimpleQueryMessage::Row(row) = message {
                let values = columns
                    .iter()
                    .enumerate()
                    .map(|(i, (_, ty))| pg_value(ty, row.get(i)))
                    .collect();
                push_result_row(&mut dataset, &origin, values)?;
            }
        }
        Ok(dataset)
    }
}

/// Map a text-format value by its column type.
fn pg_value(ty: &Type, raw: Option<&str>) -> Value {
    let Some(text) = raw else {
        return Value::Null;
    };
    match *ty {
        Type::BOOL => match text {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            other => Value::String(other.to_string()),
        },
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID | Type::FLOAT4 | Type::FLOAT8
        | Type::NUMERIC => match text.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(text.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

fn pg_error(e: ::postgres::Error) -> AcquisitionError {
    AcquisitionError::Database(e.to_string())
}

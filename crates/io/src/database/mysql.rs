// MySQL / MariaDB connector (`mysql` feature)
//
// Queries run over the binary protocol so integers and floats arrive typed.
// DECIMAL still arrives as bytes and is parsed; dates become ISO text.

use ::mysql::consts::ColumnType;
use ::mysql::prelude::Queryable;
use ::mysql::{Conn, OptsBuilder, Value as SqlValue};
use tabrecon_recon::{Dataset, Value};

use super::{push_result_row, result_dataset, ConnectionParams, Connector};
use crate::error::AcquisitionError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;

pub struct MysqlConnector;

impl Connector for MysqlConnector {
    fn query(&self, params: &ConnectionParams, sql: &str) -> Result<Dataset, AcquisitionError> {
        let host = params.host.as_deref().unwrap_or(DEFAULT_HOST);
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(host))
            .tcp_port(params.port.unwrap_or(DEFAULT_PORT))
            .db_name(Some(params.database.as_str()))
            .user(params.user.as_deref())
            .pass(params.password.as_ref().map(|p| p.expose()));
        let mut conn = Conn::new(opts).map_err(mysql_error)?;

        let mut result = conn.exec_iter(sql, ()).map_err(mysql_error)?;
        let columns: Vec<(String, ColumnType)> = result
            .columns()
            .as_ref()
            .iter()
            .map(|c| (c.name_str().into_owned(), c.column_type()))
            .collect();

        let origin = format!("{host}/{}", params.database);
        let mut dataset =
            result_dataset(&origin, columns.iter().map(|(name, _)| name.clone()).collect())?;

        for row in result.by_ref() {
            let row = row.map_err(mysql_error)?;
            let values = columns
                .iter()
                .enumerate()
                .map(|(i, (_, ty))| row.as_ref(i).map_or(Value::Null, |v| mysql_value(*ty, v)))
                .collect();
            push_result_row(&mut dataset, &origin, values)?;
        }
        Ok(dataset)
    }
}

fn mysql_value(ty: ColumnType, v: &SqlValue) -> Value {
    match v {
        SqlValue::NULL => Value::Null,
        SqlValue::Int(n) => Value::Number(*n as f64),
        SqlValue::UInt(n) => Value::Number(*n as f64),
        SqlValue::Float(f) => Value::Number(f64::from(*f)),
        SqlValue::Double(f) => Value::Number(*f),
        SqlValue::Bytes(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            let decimal = matches!(
                ty,
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL
            );
            match text.parse::<f64>() {
                Ok(n) if decimal => Value::Number(n),
                _ => Value::String(text.into_owned()),
            }
        }
        SqlValue::Date(y, mo, d, h, mi, s, us) => {
            let date = format!("{y:04}-{mo:02}-{d:02}");
            if ty == ColumnType::MYSQL_TYPE_DATE || (*h, *mi, *s, *us) == (0, 0, 0, 0) {
                Value::String(date)
            } else if *us == 0 {
                Value::String(format!("{date} {h:02}:{mi:02}:{s:02}"))
            } else {
                Value::String(format!("{date} {h:02}:{mi:02}:{s:02}.{us:06}"))
            }
        }
        SqlValue::Time(negative, days, h, mi, s, us) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u64::from(*days) * 24 + u64::from(*h);
            let base = format!("{sign}{hours:02}:{mi:02}:{s:02}");
            if *us == 0 {
                Value::String(base)
            } else {
                Value::String(format!("{base}.{us:06}"))
            }
        }
    }
}

fn mysql_error(e: ::mysql::Error) -> AcquisitionError {
    AcquisitionError::Database(e.to_string())
}

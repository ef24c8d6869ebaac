use serde_json::Value;

type Kvs = smallvec::SmallVec<[(String, Value); 8]>;

/// A log record, detached from the borrowed `log::Record`.
pub struct Item {
    pub time: std::time::SystemTime,
    pub level: log::Level,
    pub target: String,
    pub file: &'static str,
    pub line: u32,
    pub msg: String,
    pub kvs: Kvs,
}

impl<'kvs> log::kv::VisitSource<'kvs> for Item {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.kvs.push((
            key.as_str().to_string(),
            serde_json::to_value(&value).unwrap_or(Value::Null),
        ));
        Ok(())
    }
}

impl From<&log::Record<'_>> for Item {
    fn from(value: &log::Record) -> Self {
        let mut item = Item {
            time: std::time::SystemTime::now(),
            level: value.level(),
            target: value.target().to_string(),
            file: value.file_static().unwrap_or(""),
            line: value.line().unwrap_or(0),
            msg: format!("{}", value.args()),
            kvs: smallvec::smallvec![],
        };
        _ = value.key_values().visit(&mut item);
        item
    }
}

use querystring::{querify, QueryParam};
use urlencoding::decode;

pub struct QueryParams<'a> {
    vec: Vec<QueryParam<'a>>,
}

#[derive(Debug)]
pub enum ParseParamError<'a> {
    FieldRequired { name: &'a str },
}

impl<'a> QueryParams<'a> {
    pub fn parse(query: Option<&'a str>) -> QueryParams<'a> {
        match query {
            None => QueryParams { vec: Vec::new() },
            Some(s) => QueryParams { vec: querify(s) },
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vec
            .iter()
            .find(|(key, _)| key == &name)
            .and_then(|(_, value)| decode(value).ok())
            .map(|e| e.into_owned())
    }

    pub fn require<'b>(&self, name: &'b str) -> Result<String, ParseParamError<'b>> {
        match self.get(name) {
            None => Err(ParseParamError::FieldRequired { name }),
            Some(value) => Ok(value),
        }
    }
}

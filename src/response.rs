use serde::Serialize;

/// Success payload wrapper used by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_status_and_message() {
        let json =
            serde_json::to_value(Envelope::success("User fetched successfully", 42)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "User fetched successfully");
        assert_eq!(json["data"], 42);
    }
}

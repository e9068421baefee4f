use std::time::Duration;

use crate::{common::error::AppError, config::SmsSettings, db::SmsRepository};

/// SMS body limit in UTF-8 bytes; anything longer goes out as LMS.
pub const SMS_MAX_BYTES: usize = 90;
/// Hard cap for LMS; the gateway rejects longer bodies with code 0012.
pub const LMS_MAX_BYTES: usize = 2000;

const DEFAULT_LMS_SUBJECT: &str = "안내 메시지";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Sms,
    Lms,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Sms => "SMS",
            MessageKind::Lms => "LMS",
        }
    }
}

/// Picks SMS or LMS by UTF-8 byte length. Over 2000 bytes is rejected
/// here, before any network call.
pub fn classify(message: &str) -> Result<MessageKind, AppError> {
    let byte_len = message.len();
    if byte_len > LMS_MAX_BYTES {
        return Err(AppError::SmsError(format!(
            "LMS 메시지가 너무 깁니다 (최대 {}바이트, 현재 {}바이트)",
            LMS_MAX_BYTES, byte_len
        )));
    }
    if byte_len > SMS_MAX_BYTES {
        Ok(MessageKind::Lms)
    } else {
        Ok(MessageKind::Sms)
    }
}

pub fn response_code_message(code: &str) -> &'static str {
    match code {
        "0000" => "전송성공",
        "0001" => "접속에러",
        "0002" => "인증에러",
        "0003" => "잔여콜수 없음",
        "0004" => "메시지 형식에러",
        "0005" => "콜백번호 에러",
        "0006" => "수신번호 개수 에러",
        "0007" => "예약시간 에러",
        "0008" => "잔여콜수 부족",
        "0010" => "MMS NO IMG (이미지없음)",
        "0011" => "MMS ERROR TRANSFER (이미지전송오류)",
        "0012" => "메시지 길이오류(2000바이트초과)",
        "0030" => "CALLBACK AUTH FAIL (발신번호 사전등록 미등록)",
        "0033" => "CALLBACK TYPE FAIL (발신번호 형식에러)",
        "0080" => "발송제한",
        "6666" => "일시차단",
        "9999" => "요금미납",
        "0009" => "전송실패",
        _ => "알 수 없는 오류",
    }
}

#[derive(Debug, Clone)]
pub struct SendRequest {
    pub account_id: String,
    pub password: String,
    pub sender_phone: String,
    pub receiver_phone: String,
    pub message: String,
    /// LMS subject; falls back to a fixed default when empty.
    pub subject: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
    /// Number of messages the gateway accepted.
    pub sent_count: String,
    /// Remaining call count after this send, as reported by the gateway.
    pub remaining: String,
    pub msg_type: &'static str,
}

/// Parsed `code|msg|remaining|count[|etc1[|etc2]]` send response. The
/// third field is the remaining count and the fourth the sent count,
/// which is the reverse of what the field names in the vendor docs
/// suggest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub code: String,
    pub message: String,
    pub remaining: String,
    pub sent_count: String,
}

pub fn parse_send_response(body: &str) -> Result<GatewayResponse, AppError> {
    let text = body.trim();
    let parts: Vec<&str> = text.split('|').collect();
    if parts.len() < 4 {
        return Err(AppError::SmsError(format!("SMS 응답 형식 오류: {}", text)));
    }
    Ok(GatewayResponse {
        code: parts[0].to_string(),
        message: parts[1].to_string(),
        remaining: parts[2].to_string(),
        sent_count: parts[3].to_string(),
    })
}

fn lms_subject(subject: Option<&str>) -> &str {
    match subject {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_LMS_SUBJECT,
    }
}

#[derive(Clone)]
pub struct SmsService {
    client: reqwest::Client,
    settings: SmsSettings,
    sms_repo: SmsRepository,
}

impl SmsService {
    pub fn new(settings: SmsSettings, sms_repo: SmsRepository) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            sms_repo,
        }
    }

    /// Sends one message, choosing SMS or LMS by body length.
    pub async fn send(&self, req: SendRequest) -> Result<SendResponse, AppError> {
        let kind = classify(&req.message)?;

        if self.settings.mock_mode {
            tracing::info!("[Mock Mode] 실제 SMS 발송 없이 성공 응답 반환");
            return Ok(SendResponse {
                success: true,
                message: "테스트 메시지가 발송되었습니다 (Mock)".to_string(),
                code: "0000".to_string(),
                sent_count: "1".to_string(),
                remaining: "9999".to_string(),
                msg_type: kind.as_str(),
            });
        }

        let endpoint = match kind {
            MessageKind::Sms => format!("{}{}", self.settings.api_base_url, self.settings.sms_endpoint),
            MessageKind::Lms => format!("{}{}", self.settings.api_base_url, self.settings.lms_endpoint),
        };

        let mut form: Vec<(&str, String)> = vec![
            ("remote_id", req.account_id.clone()),
            ("remote_pass", req.password.clone()),
            ("remote_num", "1".to_string()),
            ("remote_phone", req.receiver_phone.clone()),
            ("remote_callback", req.sender_phone.clone()),
            ("remote_msg", req.message.clone()),
        ];
        if kind == MessageKind::Lms {
            form.push(("remote_subject", lms_subject(req.subject.as_deref()).to_string()));
        }

        tracing::info!(
            "{} 발송 요청 - 수신번호: {}, 발신번호: {}, 메시지 길이: {}바이트",
            kind.as_str(),
            req.receiver_phone,
            req.sender_phone,
            req.message.len()
        );

        let resp = self
            .client
            .post(&endpoint)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::info!("SMS API 응답 (Status: {}): {}", status, body);

        if !status.is_success() {
            return Ok(SendResponse {
                success: false,
                message: format!("SMS 발송 실패 (HTTP {}): {}", status.as_u16(), body),
                code: String::new(),
                sent_count: String::new(),
                remaining: String::new(),
                msg_type: kind.as_str(),
            });
        }

        let parsed = parse_send_response(&body)?;
        let message = response_code_message(&parsed.code).to_string();
        tracing::info!(
            "SMS API 결과 - Code: {}, Msg: {}, 전송: {}, 잔여: {}",
            parsed.code,
            message,
            parsed.sent_count,
            parsed.remaining
        );

        Ok(SendResponse {
            success: parsed.code == "0000",
            message,
            code: parsed.code,
            sent_count: parsed.sent_count,
            remaining: parsed.remaining,
            msg_type: kind.as_str(),
        })
    }

    /// Stores the remaining count the gateway reported after a send.
    /// Parse failures are logged and swallowed, the send itself already
    /// succeeded.
    pub async fn record_remaining(&self, branch_seq: i32, kind: MessageKind, remaining: &str) {
        let count = match remaining.parse::<i32>() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("잔여건수 변환 실패 ({}): {}", remaining, e);
                return;
            }
        };
        if let Err(e) = self
            .sms_repo
            .update_remaining_count(branch_seq, kind.as_str(), count)
            .await
        {
            tracing::error!("잔여건수 업데이트 실패 - 지점 {}: {}", branch_seq, e);
        }
    }

    /// Queries the gateway for the SMS and LMS remaining counts.
    pub async fn check_remaining(
        &self,
        account_id: &str,
        password: &str,
    ) -> Result<(i32, i32), AppError> {
        if self.settings.mock_mode {
            tracing::info!("[Mock Mode] 잔여건수 조회 없이 테스트 값 반환");
            return Ok((9999, 9999));
        }

        let endpoint = format!("{}/RemoteCheck.html", self.settings.api_base_url);
        let sms_count = self
            .check_remaining_by_type(&endpoint, account_id, password, "sms")
            .await?;
        let lms_count = self
            .check_remaining_by_type(&endpoint, account_id, password, "lms")
            .await?;

        tracing::info!("잔여건수 조회 완료 - SMS: {}, LMS: {}", sms_count, lms_count);
        Ok((sms_count, lms_count))
    }

    async fn check_remaining_by_type(
        &self,
        endpoint: &str,
        account_id: &str,
        password: &str,
        msg_type: &str,
    ) -> Result<i32, AppError> {
        let form = [
            ("remote_id", account_id),
            ("remote_pass", password),
            ("remote_request", msg_type),
        ];

        let resp = self
            .client
            .post(endpoint)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let text = body.trim();

        if !status.is_success() {
            return Err(AppError::SmsError(format!(
                "{} 잔여건수 조회 실패 (HTTP {}): {}",
                msg_type.to_uppercase(),
                status.as_u16(),
                text
            )));
        }

        // 결과코드|결과메시지|잔여건수
        let parts: Vec<&str> = text.split('|').collect();
        if parts.len() < 3 {
            return Err(AppError::SmsError(format!(
                "{} 잔여건수 조회 응답 형식 오류: {}",
                msg_type.to_uppercase(),
                text
            )));
        }

        parts[2].parse::<i32>().map_err(|_| {
            AppError::SmsError(format!(
                "{} 잔여건수 파싱 오류: {}",
                msg_type.to_uppercase(),
                text
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_sms() {
        assert_eq!(classify("예약 안내").unwrap(), MessageKind::Sms);
        assert_eq!(classify(&"a".repeat(90)).unwrap(), MessageKind::Sms);
    }

    #[test]
    fn over_90_bytes_is_lms() {
        assert_eq!(classify(&"a".repeat(91)).unwrap(), MessageKind::Lms);
        // 한글 한 글자는 UTF-8 3바이트
        assert_eq!(classify(&"가".repeat(30)).unwrap(), MessageKind::Sms);
        assert_eq!(classify(&"가".repeat(31)).unwrap(), MessageKind::Lms);
    }

    #[test]
    fn over_2000_bytes_is_rejected() {
        let err = classify(&"a".repeat(2001)).unwrap_err();
        assert!(matches!(err, AppError::SmsError(_)));
    }

    #[test]
    fn parses_send_response_fields() {
        let parsed = parse_send_response("0000|전송 성공|3517|1\n").unwrap();
        assert_eq!(parsed.code, "0000");
        assert_eq!(parsed.remaining, "3517");
        assert_eq!(parsed.sent_count, "1");
    }

    #[test]
    fn send_response_with_extra_fields() {
        let parsed = parse_send_response("0000|전송 성공|3517|1|etc1|etc2").unwrap();
        assert_eq!(parsed.code, "0000");
    }

    #[test]
    fn short_send_response_is_an_error() {
        assert!(parse_send_response("0000|전송 성공").is_err());
    }

    #[test]
    fn code_table_lookup() {
        assert_eq!(response_code_message("0000"), "전송성공");
        assert_eq!(response_code_message("0008"), "잔여콜수 부족");
        assert_eq!(response_code_message("9999"), "요금미납");
        assert_eq!(response_code_message("1234"), "알 수 없는 오류");
    }

    #[test]
    fn lms_subject_defaults_when_missing() {
        assert_eq!(lms_subject(None), "안내 메시지");
        assert_eq!(lms_subject(Some("")), "안내 메시지");
        assert_eq!(lms_subject(Some("이벤트 안내")), "이벤트 안내");
    }
}

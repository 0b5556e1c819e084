//! Donor-facing payment instructions per channel.
//!
//! Step lists are fixed text; only identifiers (VA number, QR, deep link)
//! come from the gateway.

use super::super::models::PaymentInstructions;
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{ChargeResponse, SnapTransaction, MANDIRI};
use reqwest::Url;

const QR_IMAGE_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

const QR_ACTIONS: [&str; 2] = ["generate-qr-code", "get-qr-code"];
const DEEPLINK_ACTIONS: [&str; 1] = ["deeplink-redirect"];

const COMMON_BANK_STEPS: [&str; 5] = [
    "Simpan Nomor Virtual Account Anda",
    "Lakukan pembayaran melalui ATM, Mobile Banking atau Internet Banking",
    "Masukkan Nomor Virtual Account sebagai nomor rekening tujuan",
    "Masukkan jumlah transfer sesuai dengan total pembayaran",
    "Konfirmasi informasi pembayaran dan selesaikan transaksi",
];

const QRIS_STEPS: [&str; 5] = [
    "Buka aplikasi mobile banking atau e-wallet yang mendukung QRIS",
    "Pilih menu Scan QR atau QRIS",
    "Scan QR Code yang ditampilkan",
    "Periksa informasi merchant dan jumlah pembayaran",
    "Konfirmasi dan selesaikan pembayaran",
];

/// Display name for a bank code
pub fn bank_name(code: &str) -> String {
    match code {
        "bca" => "Bank Central Asia (BCA)".to_string(),
        "bni" => "Bank Negara Indonesia (BNI)".to_string(),
        "bri" => "Bank Rakyat Indonesia (BRI)".to_string(),
        "mandiri" => "Bank Mandiri".to_string(),
        "permata" => "Bank Permata".to_string(),
        other => other.to_uppercase(),
    }
}

pub fn bank_transfer_steps(code: &str) -> Vec<String> {
    let specific: &[&str] = match code {
        "bca" => &[
            "Buka aplikasi BCA Mobile atau Internet Banking",
            "Pilih menu Transfer > Virtual Account",
        ],
        "bni" => &[
            "Buka aplikasi BNI Mobile atau Internet Banking",
            "Pilih menu Transfer > Virtual Account BNI",
        ],
        "bri" => &[
            "Buka aplikasi BRImo atau Internet Banking BRI",
            "Pilih menu Pembayaran > Virtual Account",
        ],
        "mandiri" => &[
            "Buka aplikasi Livin by Mandiri atau Internet Banking",
            "Pilih menu Pembayaran > Multipayment",
            "Pilih penyedia jasa \"Midtrans\"",
            "Masukkan kode pembayaran",
        ],
        "permata" => &[
            "Buka aplikasi PermataMobile atau Internet Banking",
            "Pilih menu Pembayaran > Virtual Account",
        ],
        _ => &[],
    };

    specific
        .iter()
        .chain(COMMON_BANK_STEPS.iter())
        .map(|step| step.to_string())
        .collect()
}

pub fn ewallet_steps(wallet: &str) -> Vec<String> {
    let steps: &[&str] = match wallet {
        "gopay" => &[
            "Buka aplikasi Gojek di smartphone Anda",
            "Pastikan saldo GoPay Anda mencukupi",
            "Scan QR Code yang ditampilkan",
            "Atau klik tombol \"Bayar dengan GoPay\" untuk membuka aplikasi",
            "Konfirmasi pembayaran di aplikasi Gojek",
        ],
        "shopeepay" => &[
            "Buka aplikasi Shopee di smartphone Anda",
            "Pastikan saldo ShopeePay Anda mencukupi",
            "Scan QR Code yang ditampilkan",
            "Atau klik tombol \"Bayar dengan ShopeePay\" untuk membuka aplikasi",
            "Konfirmasi pembayaran di aplikasi Shopee",
        ],
        "qris" => &QRIS_STEPS,
        _ => &[
            "Buka aplikasi e-wallet Anda",
            "Pilih menu Scan QR",
            "Scan QR Code yang ditampilkan",
            "Konfirmasi pembayaran di aplikasi",
        ],
    };

    steps.iter().map(|step| step.to_string()).collect()
}

pub fn qris_steps() -> Vec<String> {
    QRIS_STEPS.iter().map(|step| step.to_string()).collect()
}

fn known_bank_payment(code: &str) -> Option<&'static str> {
    match code {
        "bca" => Some("bca_va"),
        "bni" => Some("bni_va"),
        "bri" => Some("bri_va"),
        "mandiri" => Some("mandiri_bill"),
        "permata" => Some("permata_va"),
        _ => None,
    }
}

/// Snap `enabled_payments` for a single selected bank
pub fn snap_bank_payment(code: &str) -> &'static str {
    known_bank_payment(code).unwrap_or("bca_va")
}

/// Snap `enabled_payments` for the bank picked on the donation form; an
/// unrecognised bank leaves the donor a choice of the common VAs
pub fn donation_bank_payments(code: &str) -> Vec<String> {
    match known_bank_payment(code) {
        Some(payment) => vec![payment.to_string()],
        None => ["bca_va", "bni_va", "bri_va"]
            .iter()
            .map(|p| p.to_string())
            .collect(),
    }
}

/// Snap `enabled_payments` when the donor picked a channel but no sub-method
pub fn channel_default_payments(channel: &str) -> Vec<String> {
    let payments: &[&str] = match channel {
        "bank-transfer" => &["permata_va", "bca_va", "mandiri_bill", "bni_va", "bri_va"],
        "e-wallet" | "ewallet" => &["gopay", "shopeepay", "qris"],
        _ => &["bca_va", "bni_va", "gopay"],
    };
    payments.iter().map(|p| p.to_string()).collect()
}

/// Instructions for a Snap checkout paid by bank transfer.
///
/// The hosted page shows the VA itself, so a missing number is not an error.
/// Without a bank code the donor picks the bank on that page.
pub fn for_snap_bank(code: Option<&str>, snap: &SnapTransaction) -> PaymentInstructions {
    let va_number = snap
        .va_numbers
        .iter()
        .find(|va| code.is_some_and(|c| va.bank.eq_ignore_ascii_case(c)))
        .or_else(|| snap.va_numbers.first())
        .map(|va| va.va_number.clone())
        .filter(|va| !va.is_empty());

    PaymentInstructions {
        bank_name: code.map(bank_name),
        va_number,
        instructions: bank_transfer_steps(code.unwrap_or_default()),
        ..Default::default()
    }
}

pub fn for_snap_ewallet(wallet: &str) -> PaymentInstructions {
    PaymentInstructions {
        payment_type: Some(wallet.to_string()).filter(|w| !w.is_empty()),
        instructions: ewallet_steps(wallet),
        ..Default::default()
    }
}

/// Instructions for a direct bank charge; the VA must be present
pub fn for_bank_charge(code: &str, charge: &ChargeResponse) -> Result<PaymentInstructions> {
    let (va_number, payment_code) = match code {
        "permata" => (charge.permata_va_number.clone(), None),
        MANDIRI => (charge.bill_key.clone(), charge.biller_code.clone()),
        _ => (charge.va_number_for(code).map(str::to_string), None),
    };

    let va_number = va_number.filter(|va| !va.is_empty()).ok_or_else(|| {
        AppError::gateway_response(format!("No virtual account number for bank '{}'", code))
    })?;

    Ok(PaymentInstructions {
        bank_name: Some(bank_name(code)),
        va_number: Some(va_number),
        payment_code,
        instructions: bank_transfer_steps(code),
        expiry_time: charge.expiry_time.clone(),
        ..Default::default()
    })
}

/// Instructions for a direct e-wallet charge; needs a QR or a deep link
pub fn for_ewallet_charge(wallet: &str, charge: &ChargeResponse) -> Result<PaymentInstructions> {
    let qr_code_url = charge
        .action_url(&QR_ACTIONS)
        .map(str::to_string)
        .or_else(|| charge.qr_code_url.clone().filter(|u| !u.is_empty()));
    let deeplink_url = charge
        .action_url(&DEEPLINK_ACTIONS)
        .map(str::to_string)
        .or_else(|| charge.deeplink_url.clone().filter(|u| !u.is_empty()));

    if qr_code_url.is_none() && deeplink_url.is_none() {
        return Err(AppError::gateway_response(format!(
            "No QR code or deep link in {} charge",
            wallet
        )));
    }

    Ok(PaymentInstructions {
        payment_type: Some(wallet.to_string()),
        qr_code_url,
        deeplink_url,
        payment_code: charge.payment_code.clone(),
        instructions: ewallet_steps(wallet),
        expiry_time: charge.expiry_time.clone(),
        ..Default::default()
    })
}

/// Instructions for a QRIS charge; the QR image falls back to one rendered
/// from `qr_string`
pub fn for_qris_charge(charge: &ChargeResponse) -> Result<PaymentInstructions> {
    let qr_string = charge.qr_string.clone().filter(|s| !s.is_empty());

    let qr_code_url = match charge.action_url(&QR_ACTIONS) {
        Some(url) => Some(url.to_string()),
        None => qr_string.as_deref().map(qr_image_url).transpose()?,
    };

    let Some(qr_code_url) = qr_code_url else {
        return Err(AppError::gateway_response("No QR code in QRIS charge"));
    };

    Ok(PaymentInstructions {
        payment_type: Some("qris".to_string()),
        qr_code_url: Some(qr_code_url),
        qr_string,
        instructions: qris_steps(),
        expiry_time: charge.expiry_time.clone(),
        ..Default::default()
    })
}

/// Image URL that renders `data` as a QR code
pub fn qr_image_url(data: &str) -> Result<String> {
    Url::parse_with_params(QR_IMAGE_SERVICE, &[("data", data), ("size", "300x300")])
        .map(String::from)
        .map_err(|e| AppError::internal(format!("Invalid QR image URL: {}", e)))
}

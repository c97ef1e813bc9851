//! Contract bindings and the bundled interface artifact.

use alloy_json_abi::JsonAbi;
use alloy_primitives::hex;
use alloy_sol_types::{SolCall, SolEvent, sol};
use serde::Deserialize;

use crate::ContractError;

sol! {
    interface IWavePortal {
        struct Wave {
            address waver;
            string message;
            uint256 timestamp;
        }

        event NewWave(address indexed from, uint256 timestamp, string message);

        function getTotalWaves() external view returns (uint256);
        function wave(string message) external;
        function getAllWaves() external view returns (Wave[] memory);
    }
}

/// Hardhat artifact for the deployed contract.
pub const WAVE_PORTAL_ARTIFACT: &str = include_str!("../assets/WavePortal.json");

#[derive(Deserialize)]
struct HardhatArtifact {
    abi: JsonAbi,
}

/// Parsed interface description of the deployed contract.
#[derive(Debug, Clone)]
pub struct ContractAbi {
    abi: JsonAbi,
}

impl ContractAbi {
    /// The artifact shipped with this crate.
    pub fn bundled() -> Result<Self, ContractError> {
        Self::from_artifact(WAVE_PORTAL_ARTIFACT)
    }

    /// Accepts either a Hardhat/Foundry artifact (`{ "abi": [...] }`) or a
    /// bare ABI array.
    pub fn from_artifact(json: &str) -> Result<Self, ContractError> {
        let abi = match serde_json::from_str::<HardhatArtifact>(json) {
            Ok(artifact) => artifact.abi,
            Err(_) => serde_json::from_str::<JsonAbi>(json)
                .map_err(|err| ContractError::AbiMismatch(format!("unreadable artifact: {err}")))?,
        };
        Ok(Self { abi })
    }

    /// Every call and event the client issues must exist in the artifact with
    /// the same signature, otherwise all calls would fail on-chain.
    pub fn verify(&self) -> Result<(), ContractError> {
        self.require_function("getTotalWaves", IWavePortal::getTotalWavesCall::SELECTOR)?;
        self.require_function("wave", IWavePortal::waveCall::SELECTOR)?;
        self.require_function("getAllWaves", IWavePortal::getAllWavesCall::SELECTOR)?;

        let found = self
            .abi
            .event("NewWave")
            .is_some_and(|events| {
                events
                    .iter()
                    .any(|event| event.selector() == IWavePortal::NewWave::SIGNATURE_HASH)
            });
        if !found {
            return Err(ContractError::AbiMismatch(format!(
                "event {} missing from artifact",
                IWavePortal::NewWave::SIGNATURE
            )));
        }

        Ok(())
    }

    fn require_function(&self, name: &str, selector: [u8; 4]) -> Result<(), ContractError> {
        let found = self
            .abi
            .function(name)
            .is_some_and(|overloads| overloads.iter().any(|f| f.selector().0 == selector));
        if found {
            Ok(())
        } else {
            Err(ContractError::AbiMismatch(format!(
                "function {name} (selector 0x{}) missing from artifact",
                hex::encode(selector)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_artifact_matches_bindings() -> Result<(), ContractError> {
        ContractAbi::bundled()?.verify()
    }

    #[test]
    fn bare_abi_array_is_accepted() -> Result<(), ContractError> {
        let abi = ContractAbi::from_artifact(
            r#"[
                {"type":"function","name":"getTotalWaves","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
                {"type":"function","name":"wave","inputs":[{"name":"_message","type":"string"}],"outputs":[],"stateMutability":"nonpayable"},
                {"type":"function","name":"getAllWaves","inputs":[],"outputs":[{"name":"","type":"tuple[]","components":[{"name":"waver","type":"address"},{"name":"message","type":"string"},{"name":"timestamp","type":"uint256"}]}],"stateMutability":"view"},
                {"type":"event","name":"NewWave","anonymous":false,"inputs":[{"name":"from","type":"address","indexed":true},{"name":"timestamp","type":"uint256","indexed":false},{"name":"message","type":"string","indexed":false}]}
            ]"#,
        )?;
        abi.verify()
    }

    #[test]
    fn changed_signature_is_a_mismatch() -> Result<(), ContractError> {
        let abi = ContractAbi::from_artifact(
            r#"{"abi":[
                {"type":"function","name":"getTotalWaves","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
                {"type":"function","name":"wave","inputs":[{"name":"_message","type":"bytes"}],"outputs":[],"stateMutability":"nonpayable"}
            ]}"#,
        )?;

        let err = abi.verify().unwrap_err();
        let expected = format!("function wave (selector 0x{})", hex::encode(IWavePortal::waveCall::SELECTOR));
        assert!(matches!(err, ContractError::AbiMismatch(ref msg) if msg.starts_with(&expected)), "{err}");
        assert_eq!(expected.len(), "function wave (selector 0x)".len() + 8);
        Ok(())
    }

    #[test]
    fn signatures_match_solidity_declarations() {
        assert_eq!(IWavePortal::NewWave::SIGNATURE, "NewWave(address,uint256,string)");
        assert_eq!(IWavePortal::waveCall::SIGNATURE, "wave(string)");
    }
}

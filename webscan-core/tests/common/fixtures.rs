//! Test data fixtures for webscan-core

/// npm lockfile in the v1 `dependencies` tree format
pub fn sample_package_lock_v1() -> &'static str {
    r#"{
  "name": "legacy-app",
  "version": "1.0.0",
  "lockfileVersion": 1,
  "dependencies": {
    "express": {
      "version": "4.17.1",
      "dependencies": {
        "debug": { "version": "2.6.9" }
      }
    },
    "debug": { "version": "4.3.4", "dev": true },
    "lodash": { "version": "4.17.20" },
    "left-pad": { "version": "git+https://github.com/stevemao/left-pad.git#5f9b3a1" }
  }
}"#
}

/// npm lockfile in the v3 `packages` map format
pub fn sample_package_lock_v3() -> &'static str {
    r#"{
  "name": "modern-app",
  "version": "2.0.0",
  "lockfileVersion": 3,
  "requires": true,
  "packages": {
    "": {
      "name": "modern-app",
      "version": "2.0.0",
      "dependencies": { "express": "^4.18.2" },
      "devDependencies": { "@types/node": "^20.0.0" }
    },
    "node_modules/@types/node": {
      "version": "20.4.2",
      "resolved": "https://registry.npmjs.org/@types/node/-/node-20.4.2.tgz",
      "dev": true
    },
    "node_modules/express": {
      "version": "4.18.2",
      "resolved": "https://registry.npmjs.org/express/-/express-4.18.2.tgz"
    },
    "node_modules/fsevents": {
      "version": "2.3.2",
      "resolved": "https://registry.npmjs.org/fsevents/-/fsevents-2.3.2.tgz",
      "devOptional": true
    }
  }
}"#
}

/// requirements.txt with comments, flags and continuations
pub fn sample_requirements_txt() -> &'static str {
    r#"# production dependencies
-i https://pypi.org/simple
Django==3.2.0
requests[security]>=2.28.0
celery~=5.2 \
    # worker queue
urllib3!=1.25.0
./vendor/internal-lib
"#
}

/// Full OSV record for a lodash prototype pollution advisory
pub fn sample_osv_vulnerability() -> &'static str {
    r#"{
  "id": "GHSA-35jh-r3h4-6jhm",
  "modified": "2023-11-08T04:05:01Z",
  "published": "2021-05-06T16:05:51Z",
  "aliases": ["CVE-2021-23337"],
  "summary": "Command Injection in lodash",
  "details": "lodash versions prior to 4.17.21 are vulnerable to Command Injection via the template function.",
  "affected": [{
    "package": { "ecosystem": "npm", "name": "lodash", "purl": "pkg:npm/lodash" },
    "ranges": [{
      "type": "SEMVER",
      "events": [{ "introduced": "0" }, { "fixed": "4.17.21" }]
    }],
    "database_specific": { "source": "https://github.com/advisories/GHSA-35jh-r3h4-6jhm" }
  }],
  "references": [
    { "type": "ADVISORY", "url": "https://nvd.nist.gov/vuln/detail/CVE-2021-23337" },
    { "type": "PACKAGE", "url": "https://github.com/lodash/lodash" }
  ],
  "severity": [
    { "type": "CVSS_V3", "score": "CVSS:3.1/AV:N/AC:L/PR:H/UI:N/S:U/C:H/I:H/A:H" }
  ],
  "database_specific": { "severity": "HIGH", "cwe_ids": ["CWE-77", "CWE-94"] }
}"#
}
